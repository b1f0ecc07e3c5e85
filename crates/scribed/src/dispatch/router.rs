//! Choosing the domain handler for an authenticated request.

use std::io::Write;
use std::sync::Arc;

use scribe_core::{EditCapability, ThemeFiles};
use tracing::debug;

use super::errors::DispatchError;
use super::request::CommandRequest;
use super::response::ResponseWriter;
use super::theme::{ThemeHandler, ThemeOperation};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes requests to the one domain the daemon serves, `theme`.
#[derive(Debug, Clone)]
pub(crate) struct DomainRouter {
    theme: ThemeHandler,
}

impl DomainRouter {
    pub(crate) fn new(files: Arc<ThemeFiles>) -> Self {
        Self {
            theme: ThemeHandler::new(files),
        }
    }

    /// Runs `request` and returns the client's exit status.
    ///
    /// Operation failures are written as envelopes and only show in the
    /// status. An `Err` is a protocol failure the caller still has to report;
    /// nothing has been written for it.
    pub(crate) fn route<W: Write>(
        &self,
        request: &CommandRequest,
        capability: &EditCapability,
        writer: &mut ResponseWriter<W>,
    ) -> Result<i32, DispatchError> {
        if !request.domain().eq_ignore_ascii_case("theme") {
            return Err(DispatchError::UnknownDomain(request.domain().to_owned()));
        }
        let operation = ThemeOperation::parse(request.operation())?;
        debug!(
            target: DISPATCH_TARGET,
            operation = operation.as_str(),
            "routing theme command"
        );
        self.theme.handle(operation, capability, request, writer)
    }
}
