//! Configuration loaders that keep sockets and theme roots in temporary
//! directories.

use std::ffi::OsString;
use std::fs;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use tempfile::TempDir;

use scribe_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

pub(crate) const TEST_TOKEN: &str = "test-token";

/// Loader that provisions a Unix socket and a theme root under one temporary
/// directory.
pub(crate) struct TestConfigLoader {
    dir: TempDir,
    theme_root: Utf8PathBuf,
}

impl TestConfigLoader {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory");
        let mut loader = Self {
            dir,
            theme_root: Utf8PathBuf::new(),
        };
        loader.theme_root = loader.base().join("theme");
        fs::create_dir_all(&loader.theme_root).expect("create theme root");
        loader
    }

    /// Points the configuration at a theme root that was never created.
    pub(crate) fn with_missing_theme_root() -> Self {
        let mut loader = Self::new();
        loader.theme_root = loader.theme_root.join("absent");
        loader
    }

    pub(crate) fn socket_path(&self) -> Utf8PathBuf {
        self.base().join("scribed.sock")
    }

    fn base(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf())
            .expect("temporary directory was not valid UTF-8")
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config::default()
            .with_daemon_socket(SocketEndpoint::unix(self.socket_path()))
            .with_theme_root(self.theme_root.clone())
            .with_access_token(TEST_TOKEN))
    }
}

/// Loader that fails by passing an unsupported socket scheme.
pub(crate) struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("scribed"),
            OsString::from("--daemon-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
