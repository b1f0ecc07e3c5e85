//! Shared doubles for the daemon test suites.

mod config_loader;
mod reporter;

pub(crate) use config_loader::{FailingConfigLoader, TEST_TOKEN, TestConfigLoader};
pub(crate) use reporter::{HealthEvent, RecordingHealthReporter};
