//! Confined, hash-guarded editing of theme files.
//!
//! The crate lets an authenticated caller read and conditionally overwrite a
//! single text file that must stay inside a trusted root directory. Two
//! collaborating pieces do the work:
//!
//! - The [`PathResolver`] canonicalizes a caller-supplied relative path and
//!   proves it lands inside the root. Symlinks and `..` segments are resolved
//!   after joining, so the containment check sees where traversal actually
//!   ends up.
//! - The [`ConditionalFileEditor`] reads files and performs the
//!   read-hash-compare-write sequence. A write only proceeds when the SHA-256
//!   digest of the current bytes equals the digest the caller observed on its
//!   last read; otherwise it fails with [`EditorError::HashMismatch`] and the
//!   caller must read again. There is no retry loop here.
//!
//! [`ThemeFiles`] composes both for one request and validates parameters. Its
//! entry points take an [`EditCapability`], so the host decides who may edit
//! and the core never consults ambient identity.
//!
//! ```rust,no_run
//! use scribe_core::{EditCapability, EditRequest, ThemeFiles};
//!
//! # fn main() -> Result<(), scribe_core::EditorError> {
//! let files = ThemeFiles::new("/site/theme");
//! let capability = EditCapability::granted_to("operator");
//!
//! let current = files.read_file(&capability, "style.css")?;
//! let request = EditRequest::new("style.css", "body{color:red}", current.hash);
//! let result = files.edit_file(&capability, &request)?;
//! println!("new digest {}", result.hash);
//! # Ok(()) }
//! ```

mod capability;
mod digest;
mod editor;
mod error;
mod lock;
mod resolver;
mod theme_files;

pub use capability::EditCapability;
pub use digest::ContentDigest;
pub use editor::{ConditionalFileEditor, EditRequest, EditResult, FileState};
pub use error::EditorError;
pub use resolver::{PathResolver, RelativePath, ResolvedPath, RootDirectory};
pub use theme_files::{ReadOutcome, ThemeFiles};

/// Tracing target for confinement violations worth auditing.
pub const SECURITY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::security");

#[cfg(test)]
mod tests;
