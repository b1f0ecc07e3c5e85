//! Reporter double that keeps what the daemon announced.

use std::sync::Mutex;

use crate::health::{HealthReporter, LifecycleEvent};

/// Owned copy of a [`LifecycleEvent`], reduced to what tests assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ThemeRootUnavailable,
    Serving,
    Stopped,
}

impl From<LifecycleEvent<'_>> for HealthEvent {
    fn from(event: LifecycleEvent<'_>) -> Self {
        match event {
            LifecycleEvent::BootstrapStarting => Self::BootstrapStarting,
            LifecycleEvent::BootstrapSucceeded { .. } => Self::BootstrapSucceeded,
            LifecycleEvent::BootstrapFailed { error } => Self::BootstrapFailed(error.to_string()),
            LifecycleEvent::ThemeRootUnavailable { .. } => Self::ThemeRootUnavailable,
            LifecycleEvent::Serving { .. } => Self::Serving,
            LifecycleEvent::Stopped { .. } => Self::Stopped,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events.lock().expect("reporter lock").clone()
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn report(&self, event: LifecycleEvent<'_>) {
        self.events.lock().expect("reporter lock").push(event.into());
    }
}
