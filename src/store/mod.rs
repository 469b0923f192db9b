//! Structured attraction store abstraction.
//!
//! The [`AttractionStore`] trait defines every query the structured
//! retrieval path needs, so the resolver runs unchanged against SQLite in
//! production and an in-memory store in tests.
//!
//! Implementations must be `Send + Sync`; one instance is shared by all
//! concurrent requests.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Attraction, TicketQuote};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Direction of an aggregate price lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrder {
    Cheapest,
    MostExpensive,
}

/// Read access to attraction facts, plus the single write used by seeding.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`attraction_names`](AttractionStore::attraction_names) | Every canonical name, in insertion order |
/// | [`attraction`](AttractionStore::attraction) | Hours and tickets for one attraction |
/// | [`extreme_ticket`](AttractionStore::extreme_ticket) | Global min/max ticket, first row wins ties |
/// | [`upsert_attraction`](AttractionStore::upsert_attraction) | Insert or replace an attraction |
/// | [`ping`](AttractionStore::ping) | Reachability probe |
#[async_trait]
pub trait AttractionStore: Send + Sync {
    async fn attraction_names(&self) -> Result<Vec<String>>;

    /// Looks up an attraction by exact canonical name.
    async fn attraction(&self, name: &str) -> Result<Option<Attraction>>;

    /// Returns the single cheapest or most expensive ticket across the
    /// whole store. Among equal prices the earliest-inserted ticket wins.
    async fn extreme_ticket(&self, order: PriceOrder) -> Result<Option<TicketQuote>>;

    /// Inserts the attraction or, when the name exists, replaces its hours
    /// and tickets.
    async fn upsert_attraction(&self, attraction: &Attraction) -> Result<()>;

    async fn ping(&self) -> bool;
}
