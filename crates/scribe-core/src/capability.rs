//! Explicit authorization context for edit operations.

/// Proof that the host authorised the caller to read and edit theme files.
///
/// The core does not authenticate anyone. Hosts construct a capability once
/// they have verified the caller by whatever means they use, and pass it to
/// every [`crate::ThemeFiles`] entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCapability {
    subject: String,
}

impl EditCapability {
    /// Grants the capability to the named subject.
    #[must_use]
    pub fn granted_to(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Name of the authorised subject, recorded in logs.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}
