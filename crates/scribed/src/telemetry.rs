//! Structured telemetry initialisation for the daemon.
//!
//! Events go to stderr through one formatting layer chosen by
//! [`LogFormat`] beneath an [`EnvFilter`] built from the configured
//! directives.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt};

use scribe_config::{Config, LogFormat};

static TELEMETRY: OnceCell<()> = OnceCell::new();

/// Proof that the process-wide subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter directives did not parse.
    #[error("invalid log filter {directives:?}: {reason}")]
    Filter { directives: String, reason: String },
    /// Another subscriber already owns the process.
    #[error("failed to install telemetry subscriber: {0}")]
    Install(#[source] TryInitError),
}

/// Installs the subscriber the first time it is called. Later calls keep the
/// first configuration, which lets tests bootstrap many daemons in one
/// process.
pub(crate) fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY
        .get_or_try_init(|| {
            tracing_subscriber::registry()
                .with(output_layer(config.log_format()))
                .with(filter_from(config.log_filter())?)
                .try_init()
                .map_err(TelemetryError::Install)
        })
        .map(|_| TelemetryHandle)
}

fn filter_from(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|error| TelemetryError::Filter {
        directives: directives.to_owned(),
        reason: error.to_string(),
    })
}

fn output_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());
    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}
