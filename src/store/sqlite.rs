//! SQLite-backed [`AttractionStore`] implementation.
//!
//! Maps each store operation onto parameterised queries against the
//! `attractions`, `opening_hours` and `tickets` tables created by
//! [`migrate::apply`](crate::migrate::apply).

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::db;
use crate::models::{Attraction, OpeningHours, TicketPrice, TicketQuote};

use super::{AttractionStore, PriceOrder};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AttractionStore for SqliteStore {
    async fn attraction_names(&self) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM attractions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn attraction(&self, name: &str) -> Result<Option<Attraction>> {
        let row = sqlx::query("SELECT id, name FROM attractions WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };
        let attraction_id: i64 = row.get("id");

        let hours = sqlx::query(
            "SELECT context, open_time, close_time FROM opening_hours WHERE attraction_id = ? ORDER BY id",
        )
        .bind(attraction_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|r| OpeningHours {
            context: r.get("context"),
            open: r.get("open_time"),
            close: r.get("close_time"),
        })
        .collect();

        let tickets = sqlx::query(
            "SELECT ticket_type, price, currency FROM tickets WHERE attraction_id = ? ORDER BY id",
        )
        .bind(attraction_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|r| TicketPrice {
            ticket_type: r.get("ticket_type"),
            price: r.get("price"),
            currency: r.get("currency"),
        })
        .collect();

        Ok(Some(Attraction {
            name: row.get("name"),
            hours,
            tickets,
        }))
    }

    async fn extreme_ticket(&self, order: PriceOrder) -> Result<Option<TicketQuote>> {
        let sql = match order {
            PriceOrder::Cheapest => {
                r#"
                SELECT a.name, t.ticket_type, t.price, t.currency
                FROM tickets t
                JOIN attractions a ON a.id = t.attraction_id
                ORDER BY t.price ASC, t.id ASC
                LIMIT 1
                "#
            }
            PriceOrder::MostExpensive => {
                r#"
                SELECT a.name, t.ticket_type, t.price, t.currency
                FROM tickets t
                JOIN attractions a ON a.id = t.attraction_id
                ORDER BY t.price DESC, t.id ASC
                LIMIT 1
                "#
            }
        };

        let row = sqlx::query(sql).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| TicketQuote {
            attraction: r.get("name"),
            ticket: TicketPrice {
                ticket_type: r.get("ticket_type"),
                price: r.get("price"),
                currency: r.get("currency"),
            },
        }))
    }

    async fn upsert_attraction(&self, attraction: &Attraction) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO attractions (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(&attraction.name)
            .execute(&mut *tx)
            .await?;

        let attraction_id: i64 = sqlx::query_scalar("SELECT id FROM attractions WHERE name = ?")
            .bind(&attraction.name)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM opening_hours WHERE attraction_id = ?")
            .bind(attraction_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tickets WHERE attraction_id = ?")
            .bind(attraction_id)
            .execute(&mut *tx)
            .await?;

        for h in &attraction.hours {
            sqlx::query(
                "INSERT INTO opening_hours (attraction_id, context, open_time, close_time) VALUES (?, ?, ?, ?)",
            )
            .bind(attraction_id)
            .bind(&h.context)
            .bind(&h.open)
            .bind(&h.close)
            .execute(&mut *tx)
            .await?;
        }

        for t in &attraction.tickets {
            sqlx::query(
                "INSERT INTO tickets (attraction_id, ticket_type, price, currency) VALUES (?, ?, ?, ?)",
            )
            .bind(attraction_id)
            .bind(&t.ticket_type)
            .bind(t.price)
            .bind(&t.currency)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        db::ping(&self.pool).await
    }
}
