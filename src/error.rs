//! Error types shared across the request path.
//!
//! Most code returns `anyhow::Result`. The two enums here sit at the seams
//! where callers need to branch on the kind of failure: [`ServiceError`]
//! tells the retry loop whether another attempt can help, and
//! [`PipelineError`] tells the HTTP layer which status to return.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by an external HTTP service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Rate limited or server-side failure; worth retrying.
    #[error("{service} unavailable ({status}): {body}")]
    Unavailable {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Client error other than 429; retrying will not help.
    #[error("{service} rejected the request ({status}): {body}")]
    Rejected {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The service answered but the payload was not what we expected.
    #[error("invalid response from {service}: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },
}

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Unavailable { .. })
    }
}

/// Terminal failure of one chat request.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("request exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}
