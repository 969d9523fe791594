//! Shared test utilities for omo-switch crates.
//!
//! Fixtures here lay out a throwaway config home and project directory so
//! tests never touch the real `~/.config/omo-switch`.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::SystemTime;

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = omo_switch_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Sets a file's modification time.
pub fn set_mtime(path: &Path, mtime: SystemTime) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new().write(true).open(path)?;
    file.set_modified(mtime)
}

/// Temp config home plus a project directory carrying a `.opencode/` marker.
///
/// The tempdir is removed when the fixture drops.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// Stand-in for `$XDG_CONFIG_HOME`
    pub config_home: PathBuf,
    /// `<config_home>/omo-switch`
    pub store_root: PathBuf,
    /// A project root containing `.opencode/`
    pub project_root: PathBuf,
}

impl TestFixture {
    /// Creates `config/` and `project/.opencode/` inside a fresh tempdir.
    ///
    /// Does NOT set any env var - use `config_home_guard()` for that.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let config_home = tempdir.path().join("config");
        let store_root = config_home.join("omo-switch");
        let project_root = tempdir.path().join("project");

        std::fs::create_dir_all(&config_home)?;
        std::fs::create_dir_all(project_root.join(".opencode"))?;

        Ok(Self {
            tempdir,
            config_home,
            store_root,
            project_root,
        })
    }

    /// Create an RAII guard that points `XDG_CONFIG_HOME` at this fixture.
    pub fn config_home_guard(&self) -> EnvVarGuard {
        set_env_var("XDG_CONFIG_HOME", self.config_home.to_str())
    }

    /// Path of `<id>.<ext>` in the global profile directory.
    pub fn global_config_file(&self, id: &str, ext: &str) -> PathBuf {
        self.store_root.join("configs").join(format!("{id}.{ext}"))
    }

    /// Path of `<id>.<ext>` in the project profile directory.
    pub fn project_config_file(&self, id: &str, ext: &str) -> PathBuf {
        self.project_root
            .join(".opencode/omo-configs")
            .join(format!("{id}.{ext}"))
    }

    /// Writes `content` to `path`, creating parent directories.
    pub fn write(&self, path: &Path, content: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }
}
