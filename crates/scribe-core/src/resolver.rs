//! Canonical path resolution confined to a root directory.
//!
//! Resolution joins the caller's relative path onto the root first and only
//! then canonicalizes, so symlinks and `..` segments are judged by where they
//! actually land. Containment is checked component-wise on the canonical
//! forms: `themes/foo-evil` is not inside `themes/foo`.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::SECURITY_TARGET;
use crate::error::EditorError;

const RESOLVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::resolver");

/// Trusted directory that every resolved path must stay inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDirectory(PathBuf);

impl RootDirectory {
    /// Wraps the configured root.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Returns the root as configured (not canonicalized).
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for RootDirectory {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for RootDirectory {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<&str> for RootDirectory {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

/// Caller-supplied path naming a file beneath the root.
///
/// Leading separators are stripped on construction so `/style.css` and
/// `style.css` name the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalizes a raw request value.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim_start_matches(is_separator).to_owned())
    }

    /// Returns the normalized path text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when nothing remains after normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// A path proven to lie inside its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    root: PathBuf,
    target: PathBuf,
    relative: RelativePath,
}

impl ResolvedPath {
    /// Canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical target path.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The normalized relative path the caller asked for.
    #[must_use]
    pub fn relative(&self) -> &RelativePath {
        &self.relative
    }
}

/// Resolves relative paths against a fixed root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: RootDirectory,
}

impl PathResolver {
    /// Builds a resolver for the given root.
    #[must_use]
    pub fn new(root: impl Into<RootDirectory>) -> Self {
        Self { root: root.into() }
    }

    /// Root this resolver confines paths to.
    #[must_use]
    pub fn root(&self) -> &RootDirectory {
        &self.root
    }

    /// Canonicalizes `relative` beneath the root and checks containment.
    ///
    /// The root is canonicalized on every call; nothing is cached between
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidPath`] when either the root or the joined
    /// path cannot be canonicalized (missing, broken symlink, permission
    /// denied on a parent), and [`EditorError::OutsideRoot`] when the
    /// canonical target escapes the canonical root. A target that does not
    /// exist but whose `..` segments climb out of the root is also
    /// [`EditorError::OutsideRoot`].
    pub fn resolve(&self, relative: &RelativePath) -> Result<ResolvedPath, EditorError> {
        let invalid = |source| EditorError::InvalidPath {
            path: relative.to_string(),
            source,
        };

        let root = fs::canonicalize(self.root.as_path()).map_err(invalid)?;
        let joined = root.join(relative.as_str());
        let target = match fs::canonicalize(&joined) {
            Ok(target) => target,
            Err(source) => {
                // Traversal aimed outside the root is reported as such even
                // when the target does not exist.
                let lexical = normalize_lexically(&joined);
                if !lexical.starts_with(&root) {
                    return Err(outside_root(relative, &lexical, &root));
                }
                return Err(invalid(source));
            }
        };

        if !target.starts_with(&root) {
            return Err(outside_root(relative, &target, &root));
        }

        debug!(
            target: RESOLVER_TARGET,
            requested = relative.as_str(),
            resolved = %target.display(),
            "resolved path"
        );

        Ok(ResolvedPath {
            root,
            target,
            relative: relative.clone(),
        })
    }
}

fn outside_root(relative: &RelativePath, resolved: &Path, root: &Path) -> EditorError {
    warn!(
        target: SECURITY_TARGET,
        requested = relative.as_str(),
        resolved = %resolved.display(),
        root = %root.display(),
        "rejected path outside root"
    );
    EditorError::OutsideRoot {
        path: relative.to_string(),
    }
}

/// Collapses `.` and `..` without touching the filesystem.
///
/// Only used to classify a path that failed canonicalization; it never grants
/// access because symlinks are not followed.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
