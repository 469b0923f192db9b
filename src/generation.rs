//! Answer generation through a chat-completions deployment.
//!
//! The [`Generator`] trait is the black-box boundary: one system
//! instruction plus one user message in, free text out. No tools, no
//! conversation state.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{resolve_secret, GenerationConfig};
use crate::error::ServiceError;
use crate::http::{build_client, join_url, read_json};
use crate::retry::{with_retry, RetryPolicy};

const SERVICE: &str = "generation";

pub const SYSTEM_PROMPT: &str = "Ești un asistent de turism pentru Paris. Folosește DOAR contextul dat. \
Dacă nu ai informația în context, spune că nu apare în date. \
Răspunde fără secțiunea 'Citations:' - aceasta va fi adăugată separat.";

/// User message: the question followed by the assembled context. An empty
/// context is sent as-is so the model reports the data as unavailable.
pub fn build_user_message(question: &str, context: &str) -> String {
    format!("Întrebare: {}\n\nContext:\n{}", question, context)
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Azure OpenAI chat completions client.
pub struct AzureChatClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    retry: RetryPolicy,
}

impl AzureChatClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let url = join_url(
            &config.endpoint,
            &format!(
                "openai/deployments/{}/chat/completions?api-version={}",
                config.deployment, config.api_version
            ),
        );
        Ok(Self {
            http: build_client(config.timeout_secs)?,
            url,
            api_key: resolve_secret(&config.api_key_env)?,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    async fn complete_once(&self, body: &Value) -> Result<String> {
        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        let json = read_json(SERVICE, response).await?;
        parse_chat_response(&json)
    }
}

#[async_trait]
impl Generator for AzureChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });
        with_retry(self.retry, SERVICE, || self.complete_once(&body)).await
    }
}

/// Extracts `choices[0].message.content`.
pub fn parse_chat_response(json: &Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ServiceError::InvalidResponse {
                service: SERVICE,
                reason: "missing choices[0].message.content".to_string(),
            }
            .into()
        })
}
