//! Termination signal handling.
//!
//! Handlers are registered before the socket is bound, so a signal that
//! lands during startup is queued rather than killing the process with the
//! socket file still on disk.

use std::io;

use signal_hook::consts::{SIGHUP, TERM_SIGNALS};
use signal_hook::iterator::Signals;

/// Blocks the launch sequence until the daemon should stop.
pub(crate) trait ShutdownSignal {
    /// Returns the signal that ended the wait, or `None` when the source
    /// closed without delivering one.
    fn wait(&mut self) -> Option<i32>;
}

/// SIGTERM, SIGINT, SIGQUIT, and SIGHUP, captured from installation onward.
pub(crate) struct TerminationSignals {
    signals: Signals,
}

impl TerminationSignals {
    pub(crate) fn install() -> io::Result<Self> {
        let watched = TERM_SIGNALS.iter().copied().chain([SIGHUP]);
        Signals::new(watched).map(|signals| Self { signals })
    }
}

impl ShutdownSignal for TerminationSignals {
    fn wait(&mut self) -> Option<i32> {
        self.signals.forever().next()
    }
}
