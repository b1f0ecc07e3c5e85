//! Request-level entry points combining parameter checks, path resolution,
//! and the conditional editor.

use tracing::debug;

use crate::capability::EditCapability;
use crate::digest::ContentDigest;
use crate::editor::{ConditionalFileEditor, EditRequest, EditResult};
use crate::error::EditorError;
use crate::resolver::{PathResolver, RelativePath, RootDirectory};

const THEME_FILES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::theme_files");

/// Result of reading a theme file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Normalized relative path.
    pub file: RelativePath,
    /// File content as text.
    pub content: String,
    /// Digest of the raw bytes; send it back as `previous_hash`.
    pub hash: ContentDigest,
}

/// Reads and conditionally edits files beneath one root directory.
#[derive(Debug, Clone)]
pub struct ThemeFiles {
    resolver: PathResolver,
    editor: ConditionalFileEditor,
}

impl ThemeFiles {
    /// Builds the façade for the given root.
    #[must_use]
    pub fn new(root: impl Into<RootDirectory>) -> Self {
        Self {
            resolver: PathResolver::new(root),
            editor: ConditionalFileEditor::new(),
        }
    }

    /// Root directory edits are confined to.
    #[must_use]
    pub fn root(&self) -> &RootDirectory {
        self.resolver.root()
    }

    /// Reads `file` and returns its content with the digest to use for the
    /// next edit.
    ///
    /// # Errors
    ///
    /// [`EditorError::MissingParameter`] for an empty path, otherwise any
    /// resolver or read failure.
    pub fn read_file(
        &self,
        capability: &EditCapability,
        file: &str,
    ) -> Result<ReadOutcome, EditorError> {
        let relative = RelativePath::new(file);
        if relative.is_empty() {
            return Err(EditorError::missing("file"));
        }

        debug!(
            target: THEME_FILES_TARGET,
            subject = capability.subject(),
            file = relative.as_str(),
            "read requested"
        );

        let resolved = self.resolver.resolve(&relative)?;
        let state = self.editor.read(&resolved)?;
        Ok(ReadOutcome {
            content: state.text(),
            hash: state.digest(),
            file: relative,
        })
    }

    /// Replaces the content of an existing file when it still matches the
    /// caller's last read.
    ///
    /// # Errors
    ///
    /// [`EditorError::MissingParameter`] when the path or the expected digest
    /// is empty, [`EditorError::HashMismatch`] when the file changed since
    /// that read, otherwise any resolver or editor failure.
    pub fn edit_file(
        &self,
        capability: &EditCapability,
        request: &EditRequest,
    ) -> Result<EditResult, EditorError> {
        request.validate()?;

        debug!(
            target: THEME_FILES_TARGET,
            subject = capability.subject(),
            file = request.path().as_str(),
            "edit requested"
        );

        let resolved = self.resolver.resolve(request.path())?;
        self.editor.write(&resolved, request)
    }
}
