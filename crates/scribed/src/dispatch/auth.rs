//! Shared-secret authentication for incoming requests.

use scribe_core::EditCapability;
use subtle::ConstantTimeEq;
use tracing::warn;

use super::SECURITY_TARGET;
use super::errors::DispatchError;

/// Grants [`EditCapability`] to callers presenting the configured token.
#[derive(Clone)]
pub(crate) struct TokenAuthenticator {
    expected: String,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TokenAuthenticator")
            .field("configured", &!self.expected.is_empty())
            .finish()
    }
}

impl TokenAuthenticator {
    pub(crate) fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Checks `presented` against the configured token in constant time.
    ///
    /// An empty configured token refuses everyone, as does a missing or
    /// empty presented token.
    pub(crate) fn authenticate(
        &self,
        presented: Option<&str>,
        peer: &str,
    ) -> Result<EditCapability, DispatchError> {
        let presented = presented.unwrap_or_default();
        let accepted = !self.expected.is_empty()
            && bool::from(self.expected.as_bytes().ct_eq(presented.as_bytes()));
        if !accepted {
            warn!(
                target: SECURITY_TARGET,
                peer,
                token_present = !presented.is_empty(),
                "rejected unauthenticated request"
            );
            return Err(DispatchError::Unauthorized);
        }
        Ok(EditCapability::granted_to(format!("token@{peer}")))
    }
}
