//! Protocol-level failures.
//!
//! Anything that goes wrong before an operation runs, or while its reply is
//! written, is a [`DispatchError`]. Failures inside an operation are
//! [`scribe_core::EditorError`] values rendered by the theme handlers.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DispatchError {
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("invalid request: {0}")]
    InvalidShape(&'static str),
    #[error("unknown domain '{0}'")]
    UnknownDomain(String),
    #[error("unknown operation '{operation}' for domain '{domain}'")]
    UnknownOperation {
        domain: &'static str,
        operation: String,
    },
    #[error("request exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Sorry, you are not allowed to edit theme files.")]
    Unauthorized,
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DispatchError {
    /// Stable envelope `code` and HTTP-class status.
    pub(crate) fn classify(&self) -> (&'static str, u16) {
        match self {
            Self::Malformed(_) => ("malformed_request", 400),
            Self::InvalidShape(_) => ("invalid_request", 400),
            Self::InvalidArguments(_) => ("invalid_arguments", 400),
            Self::Unauthorized => ("unauthorized", 401),
            Self::UnknownDomain(_) => ("unknown_domain", 404),
            Self::UnknownOperation { .. } => ("unknown_operation", 404),
            Self::TooLarge { .. } => ("request_too_large", 413),
            Self::Io(_) => ("io_error", 500),
            Self::Encode(_) => ("encode_failed", 500),
        }
    }
}
