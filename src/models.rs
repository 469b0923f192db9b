//! Core data models used throughout the service.
//!
//! These types represent the attraction facts held by the structured store,
//! the evidence that flows from the two retrieval paths into the context
//! assembler, and the response returned to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source identifier carried by every structured-store evidence item.
pub const STRUCTURED_SOURCE: &str = "structured store";

/// Which retrieval path produced a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalPath {
    Structured,
    Document,
}

impl RetrievalPath {
    pub fn tag(&self) -> &'static str {
        match self {
            RetrievalPath::Structured => "structured",
            RetrievalPath::Document => "document",
        }
    }
}

impl fmt::Display for RetrievalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A named attraction with everything the structured store knows about it.
///
/// Also the shape of one `[[attractions]]` entry in a seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    #[serde(default)]
    pub hours: Vec<OpeningHours>,
    #[serde(default)]
    pub tickets: Vec<TicketPrice>,
}

/// Opening hours for one context (a day, a day range, a season).
/// `open`/`close` both absent means closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub context: String,
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketPrice {
    pub ticket_type: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Result of an aggregate (cheapest / most expensive) lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketQuote {
    pub attraction: String,
    pub ticket: TicketPrice,
}

/// A ranked hit returned by the document search service.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub content: String,
    pub source: String,
    pub chunk_id: i64,
    pub title: Option<String>,
    pub score: Option<f64>,
}

/// One retrieved fact or passage, already rendered for the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceItem {
    pub text: String,
    pub source: String,
    pub chunk_id: i64,
    pub path: RetrievalPath,
}

impl EvidenceItem {
    pub fn citation(&self) -> Citation {
        Citation {
            source: self.source.clone(),
            chunk_id: self.chunk_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub chunk_id: i64,
}

/// Final response for one chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub execution_flow: String,
    pub latency_ms: u64,
}
