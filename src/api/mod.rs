//! Client for the detection REST backend.
//!
//! Covers uploads (file and URL), paginated history queries and single
//! record lookups, plus the static image URL heuristic.

mod client;
mod images;
mod models;

pub use client::*;
pub use images::*;
pub use models::*;

use reqwest::StatusCode;
use thiserror::Error;

/// API error types.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("detection {0} not found")]
    NotFound(i64),
    #[error("backend returned {status}{}", format_detail(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The backend's own explanation of a rejected request, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

fn format_detail(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}
