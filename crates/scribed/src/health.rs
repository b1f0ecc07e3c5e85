//! Lifecycle reporting for the daemon.
//!
//! Bootstrap and launch describe each milestone as a [`LifecycleEvent`].
//! Production logs them on `scribed::health`; tests record them.

use std::io;

use camino::Utf8Path;
use scribe_config::{Config, SocketEndpoint};
use tracing::{error, info, warn};

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// A milestone in the daemon's life.
#[derive(Debug, Clone, Copy)]
pub enum LifecycleEvent<'a> {
    /// Configuration loading is about to begin.
    BootstrapStarting,
    /// Configuration, telemetry, and the socket directory are in place.
    BootstrapSucceeded { config: &'a Config },
    /// Bootstrap stopped at `error`.
    BootstrapFailed { error: &'a BootstrapError },
    /// The theme root did not canonicalize at startup. Requests fail with
    /// `invalid_path` until it appears.
    ThemeRootUnavailable {
        root: &'a Utf8Path,
        error: &'a io::Error,
    },
    /// The endpoint is accepting clients.
    Serving { endpoint: &'a SocketEndpoint },
    /// The accept thread has exited.
    Stopped { endpoint: &'a SocketEndpoint },
}

impl LifecycleEvent<'_> {
    /// Stable name emitted as the `event` field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BootstrapStarting => "bootstrap_starting",
            Self::BootstrapSucceeded { .. } => "bootstrap_succeeded",
            Self::BootstrapFailed { .. } => "bootstrap_failed",
            Self::ThemeRootUnavailable { .. } => "theme_root_unavailable",
            Self::Serving { .. } => "serving",
            Self::Stopped { .. } => "stopped",
        }
    }
}

/// Observer for [`LifecycleEvent`]s.
pub trait HealthReporter: Send + Sync {
    fn report(&self, event: LifecycleEvent<'_>);
}

/// Reporter that writes each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn report(&self, event: LifecycleEvent<'_>) {
        let name = event.name();
        match event {
            LifecycleEvent::BootstrapStarting => {
                info!(target: HEALTH_TARGET, event = name, "starting daemon bootstrap");
            }
            LifecycleEvent::BootstrapSucceeded { config } => info!(
                target: HEALTH_TARGET,
                event = name,
                socket = %config.daemon_socket(),
                theme_root = %config.theme_root(),
                log_format = %config.log_format(),
                authentication = !config.access_token().is_empty(),
                "daemon ready to bind"
            ),
            LifecycleEvent::BootstrapFailed { error } => {
                error!(target: HEALTH_TARGET, event = name, %error, "daemon bootstrap failed");
            }
            LifecycleEvent::ThemeRootUnavailable { root, error } => warn!(
                target: HEALTH_TARGET,
                event = name,
                theme_root = %root,
                %error,
                "theme root cannot be resolved yet"
            ),
            LifecycleEvent::Serving { endpoint } => {
                info!(target: HEALTH_TARGET, event = name, %endpoint, "accepting clients");
            }
            LifecycleEvent::Stopped { endpoint } => {
                info!(target: HEALTH_TARGET, event = name, %endpoint, "no longer accepting clients");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_snake_case_and_distinct() {
        let config = Config::default();
        let endpoint = config.daemon_socket();
        let error = io::Error::from(io::ErrorKind::NotFound);
        let names = [
            LifecycleEvent::BootstrapStarting.name(),
            LifecycleEvent::BootstrapSucceeded { config: &config }.name(),
            LifecycleEvent::ThemeRootUnavailable {
                root: config.theme_root(),
                error: &error,
            }
            .name(),
            LifecycleEvent::Serving { endpoint }.name(),
            LifecycleEvent::Stopped { endpoint }.name(),
        ];
        for (index, name) in names.iter().enumerate() {
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
            assert!(!names[index + 1..].contains(name), "{name} repeats");
        }
    }
}
