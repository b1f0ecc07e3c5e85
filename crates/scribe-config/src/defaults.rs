//! Built-in values used when no layer sets a field.

use camino::Utf8PathBuf;

use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Port for the TCP fallback endpoint.
pub const DEFAULT_TCP_PORT: u16 = 9781;

/// `tracing` filter directive applied by default.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Theme root used when none is configured: the working directory.
pub const DEFAULT_THEME_ROOT: &str = ".";

const SOCKET_DIR: &str = "scribe";
const SOCKET_FILE: &str = "scribed.sock";

/// Default filter directive.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default filter directive as an owned value for serde defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// One JSON object per event.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Working directory as the theme root.
#[must_use]
pub fn default_theme_root() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_THEME_ROOT)
}

/// Per-user socket location.
///
/// `$XDG_RUNTIME_DIR/scribe/scribed.sock` when a runtime directory exists,
/// otherwise `<tmp>/scribe/uid-<euid>/scribed.sock`. Hosts without Unix
/// sockets listen on loopback TCP instead.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    #[cfg(unix)]
    {
        let dir = dirs::runtime_dir()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .map_or_else(shared_temp_socket_dir, |runtime| runtime.join(SOCKET_DIR));
        SocketEndpoint::unix(dir.join(SOCKET_FILE))
    }
    #[cfg(not(unix))]
    {
        SocketEndpoint::tcp("127.0.0.1", DEFAULT_TCP_PORT)
    }
}

/// The temp directory is shared between users, so each gets its own
/// subdirectory.
#[cfg(unix)]
fn shared_temp_socket_dir() -> Utf8PathBuf {
    let temp = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .unwrap_or_else(|_| Utf8PathBuf::from("/tmp"));
    // SAFETY: geteuid has no preconditions and cannot fail.
    let uid = unsafe { libc::geteuid() };
    temp.join(SOCKET_DIR).join(format!("uid-{uid}"))
}
