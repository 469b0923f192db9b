//! Document retrieval through the external search service.
//!
//! [`DocumentSearch`] is the black-box boundary: a ranked top-k query that
//! returns content plus source and chunk identifiers. [`AzureSearchClient`]
//! implements it over the Azure AI Search REST API and also uploads index
//! documents for `guide index`.
//!
//! [`DocumentRetriever`] is the adapter the pipeline calls. It retries,
//! normalises hits into `document` evidence, and degrades to no evidence
//! when the service stays unavailable.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::{resolve_secret, SearchConfig};
use crate::error::ServiceError;
use crate::http::{build_client, join_url, read_json};
use crate::models::{EvidenceItem, RetrievalPath, SearchHit};
use crate::retry::{with_retry, RetryPolicy};

const SERVICE: &str = "document search";

#[async_trait]
pub trait DocumentSearch: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>>;
}

// ============ Azure AI Search ============

pub struct AzureSearchClient {
    http: reqwest::Client,
    endpoint: String,
    index: String,
    api_key: String,
    api_version: String,
}

/// One document in an index upload batch.
#[derive(Debug, Clone, Serialize)]
pub struct IndexDocument {
    #[serde(rename = "@search.action")]
    pub action: &'static str,
    pub id: String,
    pub content: String,
    pub source: String,
    pub page: i64,
    pub chunk_id: i64,
    pub title: String,
    #[serde(rename = "contentVector")]
    pub content_vector: Vec<f32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub succeeded: usize,
    pub failed: Vec<String>,
}

impl AzureSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(config.timeout_secs)?,
            endpoint: config.endpoint.clone(),
            index: config.index.clone(),
            api_key: resolve_secret(&config.api_key_env)?,
            api_version: config.api_version.clone(),
        })
    }

    fn docs_url(&self, action: &str) -> String {
        join_url(
            &self.endpoint,
            &format!(
                "indexes/{}/docs/{}?api-version={}",
                self.index, action, self.api_version
            ),
        )
    }

    /// Uploads a batch with `mergeOrUpload` semantics.
    pub async fn upload(&self, docs: &[IndexDocument]) -> Result<UploadReport> {
        let response = self
            .http
            .post(self.docs_url("index"))
            .header("api-key", &self.api_key)
            .json(&json!({ "value": docs }))
            .send()
            .await?;
        let json = read_json(SERVICE, response).await?;
        parse_upload_response(&json)
    }
}

#[async_trait]
impl DocumentSearch for AzureSearchClient {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let body = json!({
            "search": query,
            "top": top_k,
            "select": "content,source,chunk_id,title",
        });

        let response = self
            .http
            .post(self.docs_url("search"))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let json = read_json(SERVICE, response).await?;
        parse_search_response(&json)
    }
}

fn invalid(reason: impl Into<String>) -> anyhow::Error {
    ServiceError::InvalidResponse {
        service: SERVICE,
        reason: reason.into(),
    }
    .into()
}

/// The index stores `chunk_id` as a number, but older indexes typed it as a
/// string; both are accepted.
fn chunk_id_of(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses `{"value": [{"content", "source", "chunk_id", "title", "@search.score"}]}`.
pub fn parse_search_response(json: &Value) -> Result<Vec<SearchHit>> {
    let hits = json
        .get("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| invalid("missing value array"))?;

    Ok(hits
        .iter()
        .map(|hit| SearchHit {
            content: hit
                .get("content")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            source: hit
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            chunk_id: chunk_id_of(hit.get("chunk_id")).unwrap_or(0),
            title: hit.get("title").and_then(|v| v.as_str()).map(str::to_string),
            score: hit.get("@search.score").and_then(|v| v.as_f64()),
        })
        .collect())
}

pub fn parse_upload_response(json: &Value) -> Result<UploadReport> {
    let results = json
        .get("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| invalid("missing value array in upload response"))?;

    let mut report = UploadReport::default();
    for r in results {
        if r.get("status").and_then(|v| v.as_bool()).unwrap_or(false) {
            report.succeeded += 1;
        } else {
            let key = r.get("key").and_then(|v| v.as_str()).unwrap_or("?");
            let msg = r
                .get("errorMessage")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            report.failed.push(format!("{}: {}", key, msg));
        }
    }
    Ok(report)
}

// ============ Adapter ============

pub struct DocumentRetriever {
    search: Arc<dyn DocumentSearch>,
    top_k: usize,
    retry: RetryPolicy,
}

impl DocumentRetriever {
    pub fn new(search: Arc<dyn DocumentSearch>, top_k: usize, retry: RetryPolicy) -> Self {
        Self {
            search,
            top_k,
            retry,
        }
    }

    /// Returns `document` evidence in the service's rank order. Never fails.
    pub async fn retrieve(&self, question: &str) -> Vec<EvidenceItem> {
        let hits = with_retry(self.retry, SERVICE, || {
            self.search.search(question, self.top_k)
        })
        .await;

        match hits {
            Ok(hits) => {
                tracing::debug!(hits = hits.len(), "document search");
                hits.into_iter().map(document_item).collect()
            }
            Err(e) => {
                tracing::warn!(error = %format_args!("{:#}", e), "document search failed; continuing without document evidence");
                Vec::new()
            }
        }
    }
}

fn document_item(hit: SearchHit) -> EvidenceItem {
    EvidenceItem {
        text: render_hit(&hit),
        source: hit.source,
        chunk_id: hit.chunk_id,
        path: RetrievalPath::Document,
    }
}

pub fn render_hit(hit: &SearchHit) -> String {
    format!(
        "- SOURCE: {} | TITLE: {} | chunk_id: {}\n  CONTENT: {}\n",
        hit.source,
        hit.title.as_deref().unwrap_or(""),
        hit.chunk_id,
        hit.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = json!({
            "value": [
                {
                    "@search.score": 3.2,
                    "content": "Validate your ticket before boarding.",
                    "source": "transport.txt",
                    "chunk_id": 2,
                    "title": "Public transport"
                },
                {
                    "content": "Bags are screened at the entrance.",
                    "source": "louvre_rules.txt",
                    "chunk_id": "0"
                }
            ]
        });
        let hits = parse_search_response(&json).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, "transport.txt");
        assert_eq!(hits[0].chunk_id, 2);
        assert_eq!(hits[0].score, Some(3.2));
        assert_eq!(hits[1].chunk_id, 0);
        assert_eq!(hits[1].title, None);
    }

    #[test]
    fn test_parse_search_response_missing_value() {
        let err = parse_search_response(&json!({ "error": "nope" })).unwrap_err();
        let service_err = err.downcast_ref::<ServiceError>().unwrap();
        assert!(!service_err.is_retryable());
    }

    #[test]
    fn test_parse_upload_response_counts_failures() {
        let json = json!({
            "value": [
                { "key": "a", "status": true, "statusCode": 201 },
                { "key": "b", "status": false, "errorMessage": "too large", "statusCode": 400 }
            ]
        });
        let report = parse_upload_response(&json).unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, vec!["b: too large".to_string()]);
    }

    #[test]
    fn test_render_hit() {
        let hit = SearchHit {
            content: "Avoid rush hour.".to_string(),
            source: "tips.txt".to_string(),
            chunk_id: 4,
            title: Some("Tips".to_string()),
            score: None,
        };
        assert_eq!(
            render_hit(&hit),
            "- SOURCE: tips.txt | TITLE: Tips | chunk_id: 4\n  CONTENT: Avoid rush hour.\n"
        );
    }

    #[test]
    fn test_index_document_field_names() {
        let doc = IndexDocument {
            action: "mergeOrUpload",
            id: "abc".to_string(),
            content: "text".to_string(),
            source: "s".to_string(),
            page: 0,
            chunk_id: 1,
            title: "t".to_string(),
            content_vector: vec![0.5],
        };
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["@search.action"], "mergeOrUpload");
        assert_eq!(v["contentVector"][0], 0.5);
    }
}
