use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Correlates an engine command with its completion event.
pub type Ticket = u64;

/// Body of `POST /api/rag/query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl QueryRequest {
    /// An empty session id is omitted from the request.
    pub fn new(query: impl Into<String>, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        Self {
            query: query.into(),
            session_id: (!session_id.is_empty()).then_some(session_id),
        }
    }
}

/// Reply of the query service. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<serde_json::Value>>,
}

/// Body of `POST /api/feedback/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackSubmission {
    pub message_id: String,
    pub session_id: String,
    pub query: String,
    pub answer: String,
    pub is_correct: bool,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub sources: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    QueryCompleted {
        ticket: Ticket,
        result: Result<QueryResponse, ServiceError>,
    },
    FeedbackCompleted {
        ticket: Ticket,
        result: Result<(), ServiceError>,
    },
    MetricsLoaded {
        ticket: Ticket,
        result: Result<serde_json::Value, ServiceError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
        }
    }
}
