//! Embedding client used when indexing documents.
//!
//! Calls an Azure OpenAI embeddings deployment in batches and checks every
//! vector against the configured dimensionality, since a mismatch would
//! be rejected by the search index's `contentVector` field anyway.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s (capped)

use anyhow::{bail, Result};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::{resolve_secret, EmbeddingConfig};
use crate::error::ServiceError;
use crate::http::{build_client, join_url, read_json};
use crate::retry::{with_retry, RetryPolicy};

const SERVICE: &str = "embeddings";

pub struct EmbeddingClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    dims: usize,
    batch_size: usize,
    retry: RetryPolicy,
}

impl EmbeddingClient {
    /// # Errors
    ///
    /// Returns an error if `embedding.endpoint` or `embedding.deployment`
    /// is not configured, or if the API key variable is unset.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("embedding.endpoint required for indexing"))?;
        let deployment = config
            .deployment
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("embedding.deployment required for indexing"))?;

        let url = join_url(
            endpoint,
            &format!(
                "openai/deployments/{}/embeddings?api-version={}",
                deployment, config.api_version
            ),
        );

        Ok(Self {
            http: build_client(config.timeout_secs)?,
            url,
            api_key: resolve_secret(&config.api_key_env)?,
            dims: config.dims,
            batch_size: config.batch_size.max(1),
            retry: RetryPolicy::new(config.max_retries).with_base_delay(Duration::from_secs(1)),
        })
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Embeds `texts` in batches, returning one vector per input in order.
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let body = json!({ "input": batch });
            let batch_vectors = with_retry(self.retry, SERVICE, || self.embed_once(&body)).await?;

            if batch_vectors.len() != batch.len() {
                bail!(
                    "embeddings returned {} vectors for {} inputs",
                    batch_vectors.len(),
                    batch.len()
                );
            }
            for v in &batch_vectors {
                check_dims(v, self.dims)?;
            }
            vectors.extend(batch_vectors);
        }
        Ok(vectors)
    }

    async fn embed_once(&self, body: &Value) -> Result<Vec<Vec<f32>>> {
        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        let json = read_json(SERVICE, response).await?;
        parse_embeddings_response(&json)
    }
}

pub fn check_dims(vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        bail!(
            "Embedding dim mismatch: got {} expected {}",
            vector.len(),
            expected
        );
    }
    Ok(())
}

fn invalid(reason: &str) -> anyhow::Error {
    ServiceError::InvalidResponse {
        service: SERVICE,
        reason: reason.to_string(),
    }
    .into()
}

/// Parses `data[].embedding`, ordered by each item's `index` field.
pub fn parse_embeddings_response(json: &Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| invalid("missing data array"))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| invalid("missing embedding"))?;

        let vec: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(position);
        indexed.push((index, vec));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}
