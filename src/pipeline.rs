//! Request orchestration: classify → retrieve → assemble → generate.
//!
//! ```text
//!  question
//!     │
//!     ▼
//!  CLASSIFY ──┬── wants_structured ──▶ STRUCTURED_LOOKUP ─┐
//!             └── wants_document ────▶ DOCUMENT_LOOKUP ───┤  (concurrent)
//!                                                         ▼
//!                          no evidence yet and no document lookup?
//!                                 └──▶ DOCUMENT_LOOKUP (fallback)
//!                                                         ▼
//!                                               ASSEMBLE → GENERATE → RESPOND
//! ```
//!
//! A [`Pipeline`] is built once at startup and shared by every request
//! through an `Arc`; it holds only read-only handles. Each call to
//! [`Pipeline::answer`] owns its evidence and runs under a deadline that
//! cancels in-flight external calls when it expires.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::config::Config;
use crate::context::{assemble, AssembledContext};
use crate::db;
use crate::document::{AzureSearchClient, DocumentRetriever, DocumentSearch};
use crate::error::PipelineError;
use crate::generation::{build_user_message, AzureChatClient, Generator, SYSTEM_PROMPT};
use crate::intent::{Intent, IntentClassifier};
use crate::migrate;
use crate::models::{ChatResponse, EvidenceItem};
use crate::retry::RetryPolicy;
use crate::store::{AttractionStore, SqliteStore};
use crate::structured::StructuredResolver;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub top_k: usize,
    pub max_context_chars: usize,
    pub deadline: Duration,
    pub store_retry: RetryPolicy,
    pub search_retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k: config.search.top_k,
            max_context_chars: config.pipeline.max_context_chars,
            deadline: Duration::from_secs(config.pipeline.deadline_secs),
            store_retry: RetryPolicy::new(config.pipeline.store_retries),
            search_retry: RetryPolicy::new(config.search.max_retries),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chars: 12_000,
            deadline: Duration::from_secs(30),
            store_retry: RetryPolicy::default(),
            search_retry: RetryPolicy::default(),
        }
    }
}

/// Everything retrieval produced for one question, before generation.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub intent: Intent,
    pub evidence: Vec<EvidenceItem>,
    pub document_fallback: bool,
}

pub struct Pipeline {
    classifier: IntentClassifier,
    structured: StructuredResolver,
    documents: DocumentRetriever,
    generator: Arc<dyn Generator>,
    store: Arc<dyn AttractionStore>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn AttractionStore>,
        search: Arc<dyn DocumentSearch>,
        generator: Arc<dyn Generator>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            classifier: IntentClassifier::default(),
            structured: StructuredResolver::new(store.clone(), settings.store_retry),
            documents: DocumentRetriever::new(search, settings.top_k, settings.search_retry),
            generator,
            store,
            settings,
        }
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Wires the production backends: SQLite store, Azure AI Search and
    /// Azure OpenAI. Applies migrations so a fresh database is usable.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply(&pool).await?;

        let store: Arc<dyn AttractionStore> = Arc::new(SqliteStore::new(pool));
        let search: Arc<dyn DocumentSearch> = Arc::new(AzureSearchClient::new(&config.search)?);
        let generator: Arc<dyn Generator> = Arc::new(AzureChatClient::new(&config.generation)?);

        Ok(Self::new(
            store,
            search,
            generator,
            PipelineSettings::from_config(config),
        ))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn store_reachable(&self) -> bool {
        self.store.ping().await
    }

    /// Runs both retrieval paths as the intent requires. When the question
    /// did not ask for documents and the structured path came back empty,
    /// the document path runs anyway.
    pub async fn retrieve(&self, question: &str) -> Retrieval {
        let intent = self.classifier.classify(question);
        tracing::debug!(
            wants_structured = intent.wants_structured,
            wants_document = intent.wants_document,
            "classified"
        );

        let structured = async {
            if intent.wants_structured {
                self.structured.resolve(question).await
            } else {
                Vec::new()
            }
        };
        let document = async {
            if intent.wants_document {
                self.documents.retrieve(question).await
            } else {
                Vec::new()
            }
        };
        let (mut evidence, mut document_evidence) = tokio::join!(structured, document);

        let document_fallback = !intent.wants_document && evidence.is_empty();
        if document_fallback {
            tracing::debug!("no structured evidence; falling back to document search");
            document_evidence = self.documents.retrieve(question).await;
        }

        evidence.append(&mut document_evidence);
        Retrieval {
            intent,
            evidence,
            document_fallback,
        }
    }

    async fn run(&self, question: &str) -> Result<(String, AssembledContext), PipelineError> {
        let retrieval = self.retrieve(question).await;
        let context = assemble(retrieval.evidence, self.settings.max_context_chars);
        if context.truncated {
            tracing::debug!(
                max_chars = self.settings.max_context_chars,
                "context truncated to budget"
            );
        }

        let user = build_user_message(question, &context.text);
        let answer = self
            .generator
            .complete(SYSTEM_PROMPT, &user)
            .await
            .map_err(PipelineError::Generation)?;

        Ok((answer, context))
    }

    /// Answers one question end to end.
    pub async fn answer(&self, question: &str) -> Result<ChatResponse, PipelineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::EmptyQuestion);
        }

        let started = Instant::now();
        let span = tracing::info_span!("chat", question_chars = question.chars().count());

        let deadline = self.settings.deadline;
        let (answer, context) = tokio::time::timeout(deadline, self.run(question))
            .instrument(span.clone())
            .await
            .map_err(|_| PipelineError::DeadlineExceeded(deadline))??;

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.in_scope(|| {
            tracing::info!(
                flow = %context.flow_label,
                citations = context.citations.len(),
                latency_ms,
                "answered"
            );
        });

        Ok(ChatResponse {
            answer,
            citations: context.citations,
            execution_flow: context.flow_label,
            latency_ms,
        })
    }
}
