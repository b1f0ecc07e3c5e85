//! Success payloads written to stdout.

use serde::Serialize;

use scribe_core::{EditResult, ReadOutcome};

/// Payload for a successful read.
#[derive(Debug, Serialize)]
pub struct ReadFileResponse {
    pub file: String,
    pub code: String,
    pub hash: String,
    pub success: bool,
}

impl From<ReadOutcome> for ReadFileResponse {
    fn from(outcome: ReadOutcome) -> Self {
        Self {
            file: outcome.file.to_string(),
            code: outcome.content,
            hash: outcome.hash.to_hex(),
            success: true,
        }
    }
}

/// Payload for a successful edit.
#[derive(Debug, Serialize)]
pub struct EditFileResponse {
    pub success: bool,
    pub file: String,
    pub hash: String,
}

impl From<EditResult> for EditFileResponse {
    fn from(result: EditResult) -> Self {
        Self {
            success: true,
            file: result.file.to_string(),
            hash: result.hash.to_hex(),
        }
    }
}
