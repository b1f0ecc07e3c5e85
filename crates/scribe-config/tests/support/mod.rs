//! Drives one configuration load across the file, environment, and CLI
//! layers.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use ortho_config::OrthoError;
use tempfile::TempDir;

use scribe_config::Config;

/// Loads read the process environment, so tests in one binary take turns.
static PROCESS_ENV: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Inputs for a single load. Environment changes are undone on drop.
pub struct Layers {
    dir: TempDir,
    args: Vec<OsString>,
    saved_env: Vec<(&'static str, Option<OsString>)>,
    _env_lock: MutexGuard<'static, ()>,
}

impl Layers {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
            args: vec![OsString::from("scribed")],
            saved_env: Vec::new(),
            _env_lock: PROCESS_ENV.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Writes `toml` as the config file and points `--config-path` at it.
    pub fn file(&mut self, toml: &str) -> &mut Self {
        let path = self.config_path();
        fs::write(&path, toml).expect("write config file");
        self.args.push(OsString::from("--config-path"));
        self.args.push(path.into_os_string());
        self
    }

    pub fn env(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.saved_env.push((key, std::env::var_os(key)));
        // SAFETY: `PROCESS_ENV` is held for the lifetime of `self`.
        unsafe { std::env::set_var(key, value) };
        self
    }

    pub fn flag(&mut self, name: &str, value: &str) -> &mut Self {
        self.args.push(OsString::from(name));
        self.args.push(OsString::from(value));
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("scribe.toml")
    }

    pub fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(self.args.clone())
    }
}

impl Drop for Layers {
    fn drop(&mut self) {
        for (key, previous) in self.saved_env.drain(..).rev() {
            // SAFETY: the environment lock is released only after this loop.
            match previous {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}
