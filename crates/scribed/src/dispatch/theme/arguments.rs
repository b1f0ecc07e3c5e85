//! Typed arguments for the `theme` operations.
//!
//! Absent string fields decode as empty so the core reports them with its
//! own `missing_*` codes. `code` is the exception: an empty replacement is
//! legitimate, so absence is tracked separately.

use serde::Deserialize;

/// Arguments for `theme read-file`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReadFileArgs {
    /// Path relative to the theme root.
    pub file: String,
}

/// Arguments for `theme edit-file`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditFileArgs {
    /// Path relative to the theme root.
    pub file: String,
    /// Complete replacement content.
    pub code: Option<String>,
    /// Digest returned by the caller's last read.
    pub previous_hash: String,
}
