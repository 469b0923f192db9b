//! Fakes shared by the integration tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hybrid_guide::document::DocumentSearch;
use hybrid_guide::generation::Generator;
use hybrid_guide::models::{Attraction, OpeningHours, SearchHit, TicketPrice, TicketQuote};
use hybrid_guide::pipeline::{Pipeline, PipelineSettings};
use hybrid_guide::retry::RetryPolicy;
use hybrid_guide::store::{AttractionStore, InMemoryStore, PriceOrder};

/// Returns canned hits and counts calls.
pub struct FakeSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeSearch {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSearch for FakeSearch {
    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("search service unreachable");
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

/// Answers with the user message it was given, so tests can inspect the
/// assembled context through the answer.
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        Ok(user.to_string())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        bail!("model deployment not found")
    }
}

pub struct SlowGenerator(pub Duration);

#[async_trait]
impl Generator for SlowGenerator {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("too late".to_string())
    }
}

/// A store whose every query fails.
pub struct BrokenStore;

#[async_trait]
impl AttractionStore for BrokenStore {
    async fn attraction_names(&self) -> Result<Vec<String>> {
        bail!("database is locked")
    }
    async fn attraction(&self, _name: &str) -> Result<Option<Attraction>> {
        bail!("database is locked")
    }
    async fn extreme_ticket(&self, _order: PriceOrder) -> Result<Option<TicketQuote>> {
        bail!("database is locked")
    }
    async fn upsert_attraction(&self, _attraction: &Attraction) -> Result<()> {
        bail!("database is locked")
    }
    async fn ping(&self) -> bool {
        false
    }
}

pub fn ticket(ticket_type: &str, price: f64) -> TicketPrice {
    TicketPrice {
        ticket_type: ticket_type.to_string(),
        price,
        currency: "EUR".to_string(),
    }
}

pub fn attractions() -> Vec<Attraction> {
    vec![
        Attraction {
            name: "Louvre Museum".to_string(),
            hours: vec![
                OpeningHours {
                    context: "Mon-Sun".to_string(),
                    open: Some("09:00".to_string()),
                    close: Some("18:00".to_string()),
                },
                OpeningHours {
                    context: "Tuesday".to_string(),
                    open: None,
                    close: None,
                },
            ],
            tickets: vec![ticket("Adult", 22.0), ticket("Under 18", 0.0)],
        },
        Attraction {
            name: "Musée d'Orsay".to_string(),
            hours: vec![OpeningHours {
                context: "Tue-Sun".to_string(),
                open: Some("09:30".to_string()),
                close: Some("18:00".to_string()),
            }],
            tickets: vec![ticket("Adult", 16.0), ticket("Reduced", 13.5)],
        },
    ]
}

pub fn hit(source: &str, chunk_id: i64, content: &str) -> SearchHit {
    SearchHit {
        content: content.to_string(),
        source: source.to_string(),
        chunk_id,
        title: Some("Paris tips".to_string()),
        score: Some(1.0),
    }
}

pub fn default_hits() -> Vec<SearchHit> {
    vec![
        hit("louvre-rules.txt", 0, "Large bags must be left in the cloakroom."),
        hit("paris-tips.txt", 3, "Watch for pickpockets on line 1 of the metro."),
    ]
}

pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        store_retry: RetryPolicy::none(),
        search_retry: RetryPolicy::none(),
        ..PipelineSettings::default()
    }
}

pub fn pipeline_with(
    store: Arc<dyn AttractionStore>,
    search: Arc<FakeSearch>,
    generator: Arc<dyn Generator>,
    settings: PipelineSettings,
) -> Pipeline {
    Pipeline::new(store, search, generator, settings)
}

/// In-memory store with [`attractions`], default hits, echo generator.
pub fn standard_pipeline() -> (Pipeline, Arc<FakeSearch>) {
    let search = Arc::new(FakeSearch::with_hits(default_hits()));
    let pipeline = pipeline_with(
        Arc::new(InMemoryStore::with_attractions(attractions())),
        search.clone(),
        Arc::new(EchoGenerator),
        fast_settings(),
    );
    (pipeline, search)
}
