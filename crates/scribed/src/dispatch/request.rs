//! Decoding one JSONL request line.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::DispatchError;

#[derive(Deserialize)]
struct WireRequest {
    command: WireCommand,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct WireCommand {
    domain: String,
    operation: String,
}

/// A request whose envelope is well formed. Nothing about it has been
/// authenticated yet.
#[derive(Debug)]
pub(crate) struct CommandRequest {
    domain: String,
    operation: String,
    token: Option<String>,
    arguments: Value,
}

impl CommandRequest {
    /// Parses `line` and checks its shape: a non-blank domain and operation,
    /// and `arguments` that is an object or absent. Trailing whitespace,
    /// including the newline delimiter, is ignored.
    pub(crate) fn decode(line: &[u8]) -> Result<Self, DispatchError> {
        let line = line.trim_ascii_end();
        if line.is_empty() {
            return Err(DispatchError::Malformed("empty request line".to_owned()));
        }
        let wire: WireRequest = serde_json::from_slice(line)
            .map_err(|error| DispatchError::Malformed(error.to_string()))?;

        let domain = non_blank(&wire.command.domain, "domain field is empty")?;
        let operation = non_blank(&wire.command.operation, "operation field is empty")?;
        if !matches!(wire.arguments, Value::Null | Value::Object(_)) {
            return Err(DispatchError::InvalidShape(
                "arguments must be a JSON object",
            ));
        }
        Ok(Self {
            domain,
            operation,
            token: wire.token,
            arguments: wire.arguments,
        })
    }

    pub(crate) fn domain(&self) -> &str {
        &self.domain
    }

    pub(crate) fn operation(&self) -> &str {
        &self.operation
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Decodes the arguments; absent arguments yield `T::default()`.
    pub(crate) fn arguments<T>(&self) -> Result<T, DispatchError>
    where
        T: DeserializeOwned + Default,
    {
        if self.arguments.is_null() {
            return Ok(T::default());
        }
        T::deserialize(&self.arguments)
            .map_err(|error| DispatchError::InvalidArguments(error.to_string()))
    }
}

fn non_blank(value: &str, problem: &'static str) -> Result<String, DispatchError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DispatchError::InvalidShape(problem));
    }
    Ok(value.to_owned())
}
