//! Turning configuration into a ready-to-bind daemon.

use std::fs;
use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use scribe_config::{Config, EndpointError};
use scribe_core::ThemeFiles;

use crate::health::{HealthReporter, LifecycleEvent};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Source of the daemon configuration. Tests swap in temp-dir loaders.
pub trait ConfigLoader: Send + Sync {
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Merges defaults, the config file, `SCRIBE_*` variables, and the command
/// line through [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Why the daemon could not get as far as binding its socket.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<OrthoError>),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to prepare the socket directory: {0}")]
    SocketDirectory(#[from] EndpointError),
}

/// Configuration plus the shared theme façade every connection uses.
pub struct Daemon {
    config: Config,
    files: Arc<ThemeFiles>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Façade rooted at the configured theme directory.
    #[must_use]
    pub fn files(&self) -> Arc<ThemeFiles> {
        Arc::clone(&self.files)
    }

    pub(crate) fn reporter(&self) -> &dyn HealthReporter {
        self.reporter.as_ref()
    }
}

/// Loads configuration, installs telemetry, and creates the socket
/// directory, reporting the outcome to `reporter`.
///
/// A theme root that does not resolve yet is reported but not fatal. The
/// root is re-resolved on every request, so the daemon starts serving as
/// soon as the directory appears.
///
/// # Errors
///
/// Returns the first [`BootstrapError`] hit; it has already been reported.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.report(LifecycleEvent::BootstrapStarting);
    let (config, telemetry) = match prepare(loader) {
        Ok(prepared) => prepared,
        Err(error) => {
            reporter.report(LifecycleEvent::BootstrapFailed { error: &error });
            return Err(error);
        }
    };

    let root = config.theme_root();
    if let Err(error) = fs::canonicalize(root) {
        reporter.report(LifecycleEvent::ThemeRootUnavailable {
            root,
            error: &error,
        });
    }
    let files = Arc::new(ThemeFiles::new(root.as_std_path()));
    reporter.report(LifecycleEvent::BootstrapSucceeded { config: &config });

    Ok(Daemon {
        config,
        files,
        telemetry,
        reporter,
    })
}

fn prepare(loader: &dyn ConfigLoader) -> Result<(Config, TelemetryHandle), BootstrapError> {
    let config = loader.load()?;
    let telemetry = telemetry::initialise(&config)?;
    config.daemon_socket().create_socket_dir()?;
    Ok((config, telemetry))
}
