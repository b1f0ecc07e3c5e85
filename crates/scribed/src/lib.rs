//! Daemon serving confined reads and conditional edits of theme files.
//!
//! The daemon loads [`scribe_config::Config`], installs structured telemetry,
//! prepares the socket directory, and then answers one JSONL request per
//! connection. Each request carries a shared-secret token; once it checks out
//! the daemon hands an [`scribe_core::EditCapability`] to
//! [`scribe_core::ThemeFiles`], which does the actual path confinement and
//! compare-and-swap write.
//!
//! ## Protocol
//!
//! ```json
//! {"command":{"domain":"theme","operation":"read-file"},"token":"...","arguments":{"file":"style.css"}}
//! ```
//!
//! The reply is a sequence of `stream` messages followed by one `exit`
//! message. See the `dispatch` module for the payload shapes.

mod bootstrap;
mod dispatch;
mod health;
mod process;
mod telemetry;
mod transport;

pub use bootstrap::{BootstrapError, ConfigLoader, Daemon, SystemConfigLoader, bootstrap_with};
pub use health::{HealthReporter, LifecycleEvent, StructuredHealthReporter};
pub use process::{LaunchError, run_daemon};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
