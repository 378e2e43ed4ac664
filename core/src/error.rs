//! Error types for the CRM client.
//!
//! # Design
//! Transport failures, non-2xx answers and undecodable bodies get separate
//! variants so callers and logs can tell them apart, even though the web
//! handlers collapse all of them into one user-facing message. A non-2xx
//! answer keeps the CRM's structured error body when it has one.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by `CrmClient` and the code that executes its requests.
#[derive(Debug, Error)]
pub enum CrmError {
    /// The CRM could not be reached (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The CRM answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: ApiErrorBody },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl CrmError {
    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            CrmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Body of a non-2xx CRM response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorBody {
    Structured(CrmErrorBody),
    Raw(String),
}

impl ApiErrorBody {
    /// Decode the CRM error format, falling back to the raw text.
    pub fn from_raw(body: &str) -> Self {
        match serde_json::from_str::<CrmErrorBody>(body) {
            Ok(parsed) => ApiErrorBody::Structured(parsed),
            Err(_) => ApiErrorBody::Raw(body.to_string()),
        }
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorBody::Structured(err) => match &err.category {
                Some(category) => write!(f, "{} ({category})", err.message),
                None => f.write_str(&err.message),
            },
            ApiErrorBody::Raw(raw) if raw.trim().is_empty() => f.write_str("<empty body>"),
            ApiErrorBody::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Error document the CRM returns with 4xx/5xx answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    pub message: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}
