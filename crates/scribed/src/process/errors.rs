//! Errors surfaced while launching the daemon.

use std::io;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::TransportError;

/// Reasons the daemon could not start or stop cleanly.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration, telemetry, or the theme root failed to come up.
    #[error("daemon bootstrap failed: {source}")]
    Bootstrap {
        #[source]
        source: BootstrapError,
    },
    /// The endpoint could not be claimed or the accept thread died.
    #[error("daemon transport failed: {source}")]
    Transport {
        #[source]
        source: TransportError,
    },
    /// Registering termination signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        #[source]
        source: io::Error,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<TransportError> for LaunchError {
    fn from(source: TransportError) -> Self {
        Self::Transport { source }
    }
}
