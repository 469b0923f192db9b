//! In-memory [`AttractionStore`] for tests and local experiments.
//!
//! Attractions are kept in insertion order behind a `std::sync::RwLock`,
//! which gives the same tie-breaking as the SQLite store's row ids.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Attraction, TicketQuote};

use super::{AttractionStore, PriceOrder};

pub struct InMemoryStore {
    attractions: RwLock<Vec<Attraction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            attractions: RwLock::new(Vec::new()),
        }
    }

    pub fn with_attractions(attractions: Vec<Attraction>) -> Self {
        Self {
            attractions: RwLock::new(attractions),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl AttractionStore for InMemoryStore {
    async fn attraction_names(&self) -> Result<Vec<String>> {
        let guard = self.attractions.read().map_err(|_| poisoned())?;
        Ok(guard.iter().map(|a| a.name.clone()).collect())
    }

    async fn attraction(&self, name: &str) -> Result<Option<Attraction>> {
        let guard = self.attractions.read().map_err(|_| poisoned())?;
        Ok(guard.iter().find(|a| a.name == name).cloned())
    }

    async fn extreme_ticket(&self, order: PriceOrder) -> Result<Option<TicketQuote>> {
        let guard = self.attractions.read().map_err(|_| poisoned())?;
        let mut best: Option<TicketQuote> = None;

        for attraction in guard.iter() {
            for ticket in &attraction.tickets {
                // Strict comparison keeps the first row on ties
                let better = match &best {
                    None => true,
                    Some(current) => match order {
                        PriceOrder::Cheapest => ticket.price < current.ticket.price,
                        PriceOrder::MostExpensive => ticket.price > current.ticket.price,
                    },
                };
                if better {
                    best = Some(TicketQuote {
                        attraction: attraction.name.clone(),
                        ticket: ticket.clone(),
                    });
                }
            }
        }

        Ok(best)
    }

    async fn upsert_attraction(&self, attraction: &Attraction) -> Result<()> {
        let mut guard = self.attractions.write().map_err(|_| poisoned())?;
        match guard.iter_mut().find(|a| a.name == attraction.name) {
            Some(existing) => *existing = attraction.clone(),
            None => guard.push(attraction.clone()),
        }
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
