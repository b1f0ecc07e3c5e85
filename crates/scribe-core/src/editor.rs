//! Reads and compare-and-swap writes over a single resolved file.
//!
//! A write re-reads the target under an exclusive lock, hashes what it finds,
//! and only replaces the content when that digest equals the caller's token.
//! Anything else is a [`EditorError::HashMismatch`]; the caller re-reads and
//! resubmits. Nothing is cached between calls.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, Write};

use tracing::{debug, info};

use crate::digest::ContentDigest;
use crate::error::EditorError;
use crate::lock::LockedFile;
use crate::resolver::{RelativePath, ResolvedPath};

const EDITOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::editor");

const READ_FAILED: &str = "Unable to read file.";
const REREAD_FAILED: &str = "Unable to read file before writing.";

/// Content of a file and its digest at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileState {
    content: Vec<u8>,
    digest: ContentDigest,
}

impl FileState {
    /// Captures `content` and hashes it.
    #[must_use]
    pub fn new(content: Vec<u8>) -> Self {
        let digest = ContentDigest::of(&content);
        Self { content, digest }
    }

    /// Raw bytes as read.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content as text; invalid UTF-8 sequences are replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Digest of the raw bytes.
    #[must_use]
    pub const fn digest(&self) -> ContentDigest {
        self.digest
    }
}

/// A full-content replacement guarded by the digest of a prior read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    path: RelativePath,
    content: String,
    expected_digest: String,
}

impl EditRequest {
    /// Builds a request from raw parameter values.
    #[must_use]
    pub fn new(
        path: &str,
        content: impl Into<String>,
        expected_digest: impl Into<String>,
    ) -> Self {
        Self {
            path: RelativePath::new(path),
            content: content.into(),
            expected_digest: expected_digest.into(),
        }
    }

    /// Normalized target path.
    #[must_use]
    pub fn path(&self) -> &RelativePath {
        &self.path
    }

    /// Replacement content; may be empty.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Digest token from the caller's last read.
    #[must_use]
    pub fn expected_digest(&self) -> &str {
        &self.expected_digest
    }

    /// Rejects requests that lack a path or a prior-read token.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::MissingParameter`] naming `file` or
    /// `previous_hash`.
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.path.is_empty() {
            return Err(EditorError::missing("file"));
        }
        if self.expected_digest.is_empty() {
            return Err(EditorError::missing("previous_hash"));
        }
        Ok(())
    }
}

/// Outcome of a successful conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    /// Normalized path that was written.
    pub file: RelativePath,
    /// Digest of the content now on disk.
    pub hash: ContentDigest,
}

/// Stateless reader and conditional writer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConditionalFileEditor;

impl ConditionalFileEditor {
    /// Creates an editor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reads the whole target under a shared lock.
    ///
    /// # Errors
    ///
    /// [`EditorError::NotFound`] when the target is missing or not a regular
    /// file, [`EditorError::NotReadable`] on permission failures, and
    /// [`EditorError::ReadFailed`] for any other I/O error.
    pub fn read(&self, resolved: &ResolvedPath) -> Result<FileState, EditorError> {
        let path = resolved.relative().to_string();
        ensure_regular_file(resolved)?;

        let file = File::open(resolved.target()).map_err(|source| match source.kind() {
            io::ErrorKind::PermissionDenied => EditorError::NotReadable {
                path: path.clone(),
                source,
            },
            io::ErrorKind::NotFound => EditorError::NotFound { path: path.clone() },
            _ => read_failed(&path, READ_FAILED, source),
        })?;
        let mut locked =
            LockedFile::shared(file).map_err(|source| read_failed(&path, READ_FAILED, source))?;
        let content =
            read_all(locked.file()).map_err(|source| read_failed(&path, READ_FAILED, source))?;

        let state = FileState::new(content);
        debug!(
            target: EDITOR_TARGET,
            file = %path,
            bytes = state.content().len(),
            hash = %state.digest(),
            "read file"
        );
        Ok(state)
    }

    /// Replaces the target's content if it still hashes to the expected
    /// digest.
    ///
    /// The target must already exist; this never creates files. The
    /// exclusive lock is held from the re-read until the new bytes are
    /// flushed, so no cooperating writer can slip in between the comparison
    /// and the write.
    ///
    /// # Errors
    ///
    /// [`EditorError::MissingParameter`] for an empty path or token,
    /// [`EditorError::NotFound`], [`EditorError::NotWritable`],
    /// [`EditorError::ReadFailed`] when the re-read fails,
    /// [`EditorError::HashMismatch`] when the file changed, and
    /// [`EditorError::WriteFailed`] when replacing the content fails.
    pub fn write(
        &self,
        resolved: &ResolvedPath,
        request: &EditRequest,
    ) -> Result<EditResult, EditorError> {
        request.validate()?;
        let path = resolved.relative().to_string();
        ensure_regular_file(resolved)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(resolved.target())
            .map_err(|source| match source.kind() {
                io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                    EditorError::NotWritable {
                        path: path.clone(),
                        source,
                    }
                }
                io::ErrorKind::NotFound => EditorError::NotFound { path: path.clone() },
                _ => write_failed(&path, source),
            })?;
        let mut locked =
            LockedFile::exclusive(file).map_err(|source| write_failed(&path, source))?;

        let current = read_all(locked.file())
            .map(FileState::new)
            .map_err(|source| read_failed(&path, REREAD_FAILED, source))?;

        if !current.digest().matches(request.expected_digest()) {
            info!(
                target: EDITOR_TARGET,
                file = %path,
                current = %current.digest(),
                "rejected stale write"
            );
            return Err(EditorError::HashMismatch { path });
        }

        replace_content(locked.file(), request.content().as_bytes())
            .map_err(|source| write_failed(&path, source))?;

        let hash = ContentDigest::of(request.content());
        info!(
            target: EDITOR_TARGET,
            file = %path,
            previous = %current.digest(),
            hash = %hash,
            bytes = request.content().len(),
            "wrote file"
        );
        Ok(EditResult {
            file: resolved.relative().clone(),
            hash,
        })
    }
}

fn ensure_regular_file(resolved: &ResolvedPath) -> Result<(), EditorError> {
    match fs::metadata(resolved.target()) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        _ => Err(EditorError::NotFound {
            path: resolved.relative().to_string(),
        }),
    }
}

fn read_all(file: &mut File) -> io::Result<Vec<u8>> {
    file.rewind()?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(content)
}

fn replace_content(file: &mut File, content: &[u8]) -> io::Result<()> {
    file.rewind()?;
    file.set_len(0)?;
    file.write_all(content)?;
    file.flush()?;
    file.sync_data()
}

fn read_failed(path: &str, message: &'static str, source: io::Error) -> EditorError {
    EditorError::ReadFailed {
        path: path.to_owned(),
        message,
        source,
    }
}

fn write_failed(path: &str, source: io::Error) -> EditorError {
    EditorError::WriteFailed {
        path: path.to_owned(),
        source,
    }
}
