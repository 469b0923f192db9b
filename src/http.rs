//! Shared plumbing for the JSON-over-HTTPS clients.

use anyhow::Result;
use std::time::Duration;

use crate::error::ServiceError;

pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Turns a response into JSON, classifying failures for the retry loop:
/// 429 and 5xx are retryable, any other non-success status is not.
pub async fn read_json(
    service: &'static str,
    response: reqwest::Response,
) -> Result<serde_json::Value> {
    let status = response.status();

    if status.is_success() {
        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ServiceError::InvalidResponse {
                service,
                reason: e.to_string(),
            })?;
        return Ok(json);
    }

    let body = response.text().await.unwrap_or_default();
    if status.as_u16() == 429 || status.is_server_error() {
        Err(ServiceError::Unavailable {
            service,
            status: status.as_u16(),
            body,
        }
        .into())
    } else {
        Err(ServiceError::Rejected {
            service,
            status: status.as_u16(),
            body,
        }
        .into())
    }
}

/// Joins an endpoint and a path without doubling or dropping the slash.
pub fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
