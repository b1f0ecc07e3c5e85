//! Launch sequencing for the foreground daemon.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::{DispatchConnectionHandler, TokenAuthenticator};
use crate::health::{HealthReporter, LifecycleEvent, StructuredHealthReporter};
use crate::transport::Acceptor;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, TerminationSignals};

/// Runs the daemon until SIGTERM, SIGINT, SIGQUIT, or SIGHUP arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when signal handlers cannot be installed, when
/// bootstrap fails, or when the endpoint cannot be claimed.
pub fn run_daemon() -> Result<(), LaunchError> {
    let mut signals =
        TerminationSignals::install().map_err(|source| LaunchError::Signals { source })?;
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    run_daemon_with(&SystemConfigLoader, reporter, &mut signals)
}

pub(crate) fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &mut dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let daemon = bootstrap_with(loader, reporter)?;
    let config = daemon.config();
    let endpoint = config.daemon_socket();

    let acceptor = Acceptor::bind(endpoint)?;
    if let Some(address) = acceptor.local_addr() {
        info!(target: PROCESS_TARGET, %address, "bound tcp endpoint");
    }
    let handler = Arc::new(DispatchConnectionHandler::new(
        daemon.files(),
        TokenAuthenticator::new(config.access_token()),
    ));
    let serving = acceptor.serve(handler)?;
    daemon
        .reporter()
        .report(LifecycleEvent::Serving { endpoint });

    match shutdown.wait() {
        Some(signal) => info!(target: PROCESS_TARGET, signal, "termination signal received"),
        None => info!(target: PROCESS_TARGET, "signal source closed"),
    }
    serving.stop()?;
    daemon
        .reporter()
        .report(LifecycleEvent::Stopped { endpoint });
    info!(target: PROCESS_TARGET, "daemon stopped");
    Ok(())
}
