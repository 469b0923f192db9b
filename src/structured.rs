//! Structured query resolution against the attraction store.
//!
//! Two mutually exclusive modes, tried in order:
//!
//! 1. **Aggregate**: the question carries a cheapest/minimum or most
//!    expensive/maximum indicator. The single global min/max ticket is
//!    returned as one evidence item.
//! 2. **Entity-scoped**: the [`EntityMatcher`] resolves an attraction and
//!    one evidence item summarises its hours and every ticket line.
//!
//! Store failures never leave this module: they are retried per the
//! configured [`RetryPolicy`], logged, and turned into "no evidence".

use anyhow::Result;
use std::sync::Arc;

use crate::entity::EntityMatcher;
use crate::intent::Vocabulary;
use crate::models::{
    Attraction, EvidenceItem, OpeningHours, RetrievalPath, TicketPrice, TicketQuote,
    STRUCTURED_SOURCE,
};
use crate::retry::{with_retry, RetryPolicy};
use crate::store::{AttractionStore, PriceOrder};

/// Checked before [`PRICIEST_TERMS`]; a question naming both asks for the
/// cheapest ticket.
pub const CHEAPEST_TERMS: &[&str] = &[
    "cel mai ieftin", "cea mai ieftină", "cea mai ieftina", "cele mai ieftine",
    "ieftin", "ieftină", "ieftina", "ieftine", "ieftini", "minim", "minimă", "minima",
    "cel mai mic", "cea mai mică", "cea mai mica",
    "cheapest", "lowest", "minimum", "smallest", "least expensive",
];

pub const PRICIEST_TERMS: &[&str] = &[
    "cel mai scump", "cea mai scumpă", "cea mai scumpa", "cele mai scumpe", "scump",
    "scumpă", "scumpa", "scumpe", "maxim", "maximă", "maxima", "cel mai mare",
    "cea mai mare",
    "most expensive", "priciest", "highest", "maximum", "largest",
];

pub struct StructuredResolver {
    store: Arc<dyn AttractionStore>,
    matcher: EntityMatcher,
    cheapest: Vocabulary,
    priciest: Vocabulary,
    retry: RetryPolicy,
}

impl StructuredResolver {
    pub fn new(store: Arc<dyn AttractionStore>, retry: RetryPolicy) -> Self {
        Self {
            store,
            matcher: EntityMatcher::default(),
            cheapest: Vocabulary::new(CHEAPEST_TERMS),
            priciest: Vocabulary::new(PRICIEST_TERMS),
            retry,
        }
    }

    pub fn with_matcher(mut self, matcher: EntityMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Which aggregate lookup the question asks for, if any.
    pub fn aggregate_mode(&self, question: &str) -> Option<PriceOrder> {
        if self.cheapest.matches(question) {
            Some(PriceOrder::Cheapest)
        } else if self.priciest.matches(question) {
            Some(PriceOrder::MostExpensive)
        } else {
            None
        }
    }

    /// Returns zero or one `structured` evidence item. Never fails.
    pub async fn resolve(&self, question: &str) -> Vec<EvidenceItem> {
        match self.try_resolve(question).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %format_args!("{:#}", e), "structured store lookup failed; continuing without structured evidence");
                Vec::new()
            }
        }
    }

    async fn try_resolve(&self, question: &str) -> Result<Vec<EvidenceItem>> {
        if let Some(order) = self.aggregate_mode(question) {
            let quote = with_retry(self.retry, "structured store", || {
                self.store.extreme_ticket(order)
            })
            .await?;
            tracing::debug!(?order, found = quote.is_some(), "aggregate lookup");
            return Ok(quote
                .map(|q| structured_item(render_quote(order, &q)))
                .into_iter()
                .collect());
        }

        let names =
            with_retry(self.retry, "structured store", || self.store.attraction_names()).await?;
        let matched = self
            .matcher
            .find(question, names.iter().map(String::as_str));

        let name = match matched {
            Some(name) => name,
            None => {
                tracing::debug!("no attraction matched the question");
                return Ok(Vec::new());
            }
        };

        let attraction =
            with_retry(self.retry, "structured store", || self.store.attraction(&name)).await?;
        tracing::debug!(attraction = %name, "entity-scoped lookup");

        Ok(attraction
            .map(|a| structured_item(render_attraction(&a)))
            .into_iter()
            .collect())
    }
}

fn structured_item(text: String) -> EvidenceItem {
    EvidenceItem {
        text,
        source: STRUCTURED_SOURCE.to_string(),
        chunk_id: 0,
        path: RetrievalPath::Structured,
    }
}

/// `22` for whole amounts, `29.40` otherwise.
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{:.0}", price)
    } else {
        format!("{:.2}", price)
    }
}

fn render_ticket(t: &TicketPrice) -> String {
    format!("{}: {} {}", t.ticket_type, format_price(t.price), t.currency)
}

fn render_hours(h: &OpeningHours) -> String {
    match (&h.open, &h.close) {
        (None, None) => format!("{}: closed", h.context),
        (open, close) => format!(
            "{}: {}-{}",
            h.context,
            open.as_deref().unwrap_or("?"),
            close.as_deref().unwrap_or("?")
        ),
    }
}

/// One block per attraction: its hours and all of its ticket lines.
pub fn render_attraction(a: &Attraction) -> String {
    let hours = if a.hours.is_empty() {
        "not recorded".to_string()
    } else {
        a.hours.iter().map(render_hours).collect::<Vec<_>>().join("; ")
    };
    let tickets = if a.tickets.is_empty() {
        "not recorded".to_string()
    } else {
        a.tickets.iter().map(render_ticket).collect::<Vec<_>>().join("; ")
    };

    format!(
        "- SOURCE: {} | chunk_id: 0\n  ATTRACTION: {}\n  HOURS: {}\n  TICKETS: {}\n",
        STRUCTURED_SOURCE, a.name, hours, tickets
    )
}

pub fn render_quote(order: PriceOrder, q: &TicketQuote) -> String {
    let label = match order {
        PriceOrder::Cheapest => "CHEAPEST TICKET",
        PriceOrder::MostExpensive => "MOST EXPENSIVE TICKET",
    };
    format!(
        "- SOURCE: {} | chunk_id: 0\n  {}: {} / {}\n",
        STRUCTURED_SOURCE,
        label,
        q.attraction,
        render_ticket(&q.ticket)
    )
}
