use thiserror::Error;

use crate::FrameId;

/// Synchronous errors returned by loader operations. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("malformed url `{url}`: {reason}")]
    MalformedUrl { url: String, reason: String },
    #[error("unknown frame {0}")]
    UnknownFrame(FrameId),
    #[error("{0} is not parsing a document")]
    NotParsing(FrameId),
}

/// Error reported by the transport for one job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error {code}: {message}")]
pub struct TransportError {
    pub code: u16,
    pub message: String,
}

impl TransportError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Why a frame's document load ended without success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}
