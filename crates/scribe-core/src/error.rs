//! Failure taxonomy for theme file reads and conditional writes.
//!
//! Every variant carries a stable identifier ([`EditorError::code`]) and an
//! HTTP-class status ([`EditorError::status`]) so hosts can surface typed
//! failures without inspecting messages. Underlying I/O errors are kept as
//! sources for logging only; the rendered message never includes them.

use std::io;

use thiserror::Error;

/// Errors surfaced by [`crate::ThemeFiles`], the resolver, and the editor.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A required request parameter was empty.
    #[error("{message}")]
    MissingParameter {
        /// Wire name of the missing parameter.
        name: &'static str,
        /// Caller-facing explanation.
        message: &'static str,
    },

    /// The path could not be canonicalized.
    #[error("File path is invalid.")]
    InvalidPath {
        /// Relative path as requested.
        path: String,
        /// Canonicalization failure.
        #[source]
        source: io::Error,
    },

    /// The canonical path escapes the root directory.
    #[error("File must be within the active theme directory.")]
    OutsideRoot {
        /// Relative path as requested.
        path: String,
    },

    /// The target does not exist or is not a regular file.
    #[error("File does not exist.")]
    NotFound {
        /// Relative path as requested.
        path: String,
    },

    /// The process may not read the target.
    #[error("File is not readable.")]
    NotReadable {
        /// Relative path as requested.
        path: String,
        /// Permission failure reported by the OS.
        #[source]
        source: io::Error,
    },

    /// The process may not write the target.
    #[error("File is not writable.")]
    NotWritable {
        /// Relative path as requested.
        path: String,
        /// Permission failure reported by the OS.
        #[source]
        source: io::Error,
    },

    /// Reading the target failed.
    #[error("{message}")]
    ReadFailed {
        /// Relative path as requested.
        path: String,
        /// Caller-facing explanation; differs between plain reads and the
        /// re-read before a write.
        message: &'static str,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Writing the new content failed.
    #[error("Unable to write file.")]
    WriteFailed {
        /// Relative path as requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The file changed since the caller last read it.
    #[error("File contents changed since last read. Please read the file again before writing.")]
    HashMismatch {
        /// Relative path as requested.
        path: String,
    },
}

impl EditorError {
    /// Builds a missing-parameter error for the given wire name (`file`,
    /// `code`, or `previous_hash`).
    #[must_use]
    pub fn missing(name: &'static str) -> Self {
        let message = match name {
            "previous_hash" => "previous_hash is required. Read the file before writing.",
            "code" => "Code parameter is required.",
            _ => "File parameter is required.",
        };
        Self::MissingParameter { name, message }
    }

    /// Stable identifier shared with existing callers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameter { name, .. } => match *name {
                "previous_hash" => "missing_previous_hash",
                "code" => "missing_code",
                _ => "missing_file",
            },
            Self::InvalidPath { .. } => "invalid_path",
            Self::OutsideRoot { .. } => "path_outside_theme",
            Self::NotFound { .. } => "file_not_found",
            Self::NotReadable { .. } => "file_not_readable",
            Self::NotWritable { .. } => "file_not_writable",
            Self::ReadFailed { .. } => "read_failed",
            Self::WriteFailed { .. } => "write_failed",
            Self::HashMismatch { .. } => "hash_mismatch",
        }
    }

    /// HTTP-class status for the failure.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::MissingParameter { .. } | Self::InvalidPath { .. } => 400,
            Self::OutsideRoot { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::HashMismatch { .. } => 409,
            Self::NotReadable { .. }
            | Self::NotWritable { .. }
            | Self::ReadFailed { .. }
            | Self::WriteFailed { .. } => 500,
        }
    }

    /// True for containment violations, which auditing treats separately
    /// from ordinary lookup failures.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::OutsideRoot { .. })
    }

    /// True when a legitimate caller can recover by reading again and
    /// resubmitting with the fresh digest.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::HashMismatch { .. })
    }

    /// Relative path the failure concerns, when one was resolved.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingParameter { .. } => None,
            Self::InvalidPath { path, .. }
            | Self::OutsideRoot { path }
            | Self::NotFound { path }
            | Self::NotReadable { path, .. }
            | Self::NotWritable { path, .. }
            | Self::ReadFailed { path, .. }
            | Self::WriteFailed { path, .. }
            | Self::HashMismatch { path } => Some(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn io_error() -> io::Error {
        io::Error::other("boom")
    }

    #[rstest]
    #[case::missing_file(EditorError::missing("file"), "missing_file", 400)]
    #[case::missing_hash(EditorError::missing("previous_hash"), "missing_previous_hash", 400)]
    #[case::invalid(
        EditorError::InvalidPath { path: "x".into(), source: io_error() },
        "invalid_path",
        400
    )]
    #[case::outside(EditorError::OutsideRoot { path: "x".into() }, "path_outside_theme", 403)]
    #[case::not_found(EditorError::NotFound { path: "x".into() }, "file_not_found", 404)]
    #[case::mismatch(EditorError::HashMismatch { path: "x".into() }, "hash_mismatch", 409)]
    #[case::not_writable(
        EditorError::NotWritable { path: "x".into(), source: io_error() },
        "file_not_writable",
        500
    )]
    #[case::write_failed(
        EditorError::WriteFailed { path: "x".into(), source: io_error() },
        "write_failed",
        500
    )]
    fn maps_codes_and_statuses(
        #[case] error: EditorError,
        #[case] code: &str,
        #[case] status: u16,
    ) {
        assert_eq!(error.code(), code);
        assert_eq!(error.status(), status);
    }

    #[test]
    fn missing_hash_instructs_caller_to_read_first() {
        let error = EditorError::missing("previous_hash");
        assert!(error.to_string().contains("Read the file before writing"));
    }

    #[test]
    fn only_containment_is_a_security_violation() {
        assert!(EditorError::OutsideRoot { path: "a".into() }.is_security_violation());
        assert!(!EditorError::NotFound { path: "a".into() }.is_security_violation());
    }

    #[test]
    fn only_hash_mismatch_is_retryable() {
        assert!(EditorError::HashMismatch { path: "a".into() }.is_retryable());
        assert!(!EditorError::missing("file").is_retryable());
    }

    #[test]
    fn message_hides_io_details() {
        let error = EditorError::ReadFailed {
            path: "style.css".into(),
            message: "Unable to read file.",
            source: io::Error::other("/srv/private/secret"),
        };
        assert!(!error.to_string().contains("/srv/private"));
    }
}
