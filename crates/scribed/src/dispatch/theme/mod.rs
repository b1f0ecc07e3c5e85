//! Handlers for the `theme` domain: `read-file` and `edit-file`.

mod arguments;
mod responses;

use std::io::Write;
use std::sync::Arc;

use scribe_core::{EditCapability, EditRequest, EditorError, ThemeFiles};
use tracing::{debug, warn};

use super::SECURITY_TARGET;
use super::errors::DispatchError;
use super::request::CommandRequest;
use super::response::{ErrorEnvelope, ResponseWriter, exit_status_for};
use super::router::DISPATCH_TARGET;

use self::arguments::{EditFileArgs, ReadFileArgs};
use self::responses::{EditFileResponse, ReadFileResponse};

/// Operations supported by the `theme` domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThemeOperation {
    ReadFile,
    EditFile,
}

impl ThemeOperation {
    /// Parses an operation name (case-insensitive).
    pub(crate) fn parse(value: &str) -> Result<Self, DispatchError> {
        match value.to_ascii_lowercase().as_str() {
            "read-file" => Ok(Self::ReadFile),
            "edit-file" => Ok(Self::EditFile),
            _ => Err(DispatchError::UnknownOperation {
                domain: "theme",
                operation: value.to_owned(),
            }),
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::ReadFile => "read-file",
            Self::EditFile => "edit-file",
        }
    }
}

/// Executes theme operations against one [`ThemeFiles`] instance.
#[derive(Debug, Clone)]
pub(crate) struct ThemeHandler {
    files: Arc<ThemeFiles>,
}

impl ThemeHandler {
    pub(crate) fn new(files: Arc<ThemeFiles>) -> Self {
        Self { files }
    }

    pub(crate) fn handle<W: Write>(
        &self,
        operation: ThemeOperation,
        capability: &EditCapability,
        request: &CommandRequest,
        writer: &mut ResponseWriter<W>,
    ) -> Result<i32, DispatchError> {
        match operation {
            ThemeOperation::ReadFile => {
                let args: ReadFileArgs = request.arguments()?;
                match self.files.read_file(capability, &args.file) {
                    Ok(outcome) => {
                        writer.write_json(&ReadFileResponse::from(outcome))?;
                        Ok(0)
                    }
                    Err(error) => write_editor_error(writer, operation, &error),
                }
            }
            ThemeOperation::EditFile => {
                let args: EditFileArgs = request.arguments()?;
                match self.edit(capability, args) {
                    Ok(response) => {
                        writer.write_json(&response)?;
                        Ok(0)
                    }
                    Err(error) => write_editor_error(writer, operation, &error),
                }
            }
        }
    }

    fn edit(
        &self,
        capability: &EditCapability,
        args: EditFileArgs,
    ) -> Result<EditFileResponse, EditorError> {
        let EditFileArgs {
            file,
            code,
            previous_hash,
        } = args;
        // `code` is required but may be empty; only its absence is an error.
        let Some(code) = code else {
            return Err(EditorError::missing("code"));
        };
        let request = EditRequest::new(&file, code, previous_hash);
        self.files
            .edit_file(capability, &request)
            .map(EditFileResponse::from)
    }
}

fn write_editor_error<W: Write>(
    writer: &mut ResponseWriter<W>,
    operation: ThemeOperation,
    error: &EditorError,
) -> Result<i32, DispatchError> {
    if error.is_security_violation() {
        warn!(
            target: SECURITY_TARGET,
            operation = operation.as_str(),
            file = error.path().unwrap_or_default(),
            code = error.code(),
            "refused path outside theme root"
        );
    } else {
        debug!(
            target: DISPATCH_TARGET,
            operation = operation.as_str(),
            code = error.code(),
            error = ?error,
            "operation failed"
        );
    }
    let envelope = ErrorEnvelope::new(error.code(), error.to_string(), error.status());
    writer.write_envelope(&envelope)?;
    Ok(exit_status_for(error.status()))
}

#[cfg(test)]
mod tests;
