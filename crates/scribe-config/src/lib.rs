//! Shared configuration for the theme file daemon.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a TOML file
//! (discovered or named by `--config-path` / `SCRIBE_CONFIG_PATH`), then
//! `SCRIBE_*` environment variables, then CLI flags. Later layers win.

use std::ffi::OsString;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod socket;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TCP_PORT, DEFAULT_THEME_ROOT, default_log_filter,
    default_log_filter_string, default_log_format, default_socket_endpoint, default_theme_root,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{EndpointError, SocketEndpoint};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SCRIBE")]
pub struct Config {
    /// Directory every read and edit is confined to.
    #[ortho_config(default = default_theme_root())]
    theme_root: Utf8PathBuf,
    /// Endpoint the daemon listens on.
    #[ortho_config(default = default_socket_endpoint())]
    daemon_socket: SocketEndpoint,
    /// `tracing` filter directive.
    #[ortho_config(default = default_log_filter_string())]
    log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    log_format: LogFormat,
    /// Shared secret callers present to be granted edit rights. Empty means
    /// every request is refused.
    #[ortho_config(default = String::new())]
    access_token: String,
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when any layer fails to parse.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration treating `args` as the command line.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when any layer fails to parse.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Directory edits are confined to.
    #[must_use]
    pub fn theme_root(&self) -> &Utf8Path {
        &self.theme_root
    }

    /// Endpoint the daemon listens on.
    #[must_use]
    pub fn daemon_socket(&self) -> &SocketEndpoint {
        &self.daemon_socket
    }

    /// `tracing` filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Shared secret required from callers.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns a copy with a different theme root.
    #[must_use]
    pub fn with_theme_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.theme_root = root.into();
        self
    }

    /// Returns a copy listening on a different endpoint.
    #[must_use]
    pub fn with_daemon_socket(mut self, endpoint: SocketEndpoint) -> Self {
        self.daemon_socket = endpoint;
        self
    }

    /// Returns a copy expecting a different access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme_root: default_theme_root(),
            daemon_socket: default_socket_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            access_token: String::new(),
        }
    }
}
