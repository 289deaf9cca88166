use std::fmt;

use frameload_core::{JobEvent, JobId, TransportError};

/// One job callback, as delivered to the coordinator's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub job_id: JobId,
    pub event: JobEvent,
}

impl TransportEvent {
    pub fn new(job_id: JobId, event: JobEvent) -> Self {
        Self { job_id, event }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<FetchError> for TransportError {
    fn from(err: FetchError) -> Self {
        TransportError::new(err.kind.code(), err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl FailureKind {
    /// Numeric code handed to the coordinator. HTTP statuses keep their value;
    /// local failures use codes below 100.
    pub fn code(&self) -> u16 {
        match self {
            FailureKind::HttpStatus(code) => *code,
            FailureKind::InvalidUrl => 1,
            FailureKind::Network => 2,
            FailureKind::Timeout => 3,
            FailureKind::RedirectLimitExceeded => 4,
            FailureKind::TooLarge { .. } => 5,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
