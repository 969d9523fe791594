use crate::schema::SchemaFetch;
use anyhow::{anyhow, Context as _, Result};
use inquire::Confirm;
use omo_switch_store::{find_project_root, ConfigType, GlobalStore};
use std::path::{Path, PathBuf};

/// Everything a command handler needs from its environment.
#[derive(Debug, Clone)]
pub struct Context {
    pub global: GlobalStore,
    /// Directory project discovery starts from.
    pub cwd: PathBuf,
    pub schema_fetch: SchemaFetch,
}

impl Context {
    pub fn new(global: GlobalStore, cwd: PathBuf, schema_fetch: SchemaFetch) -> Self {
        Self {
            global,
            cwd,
            schema_fetch,
        }
    }

    /// Context for the running process: resolved store root, current
    /// directory and schema settings from the environment.
    pub fn from_env() -> Result<Self> {
        let global = GlobalStore::new().context("failed to resolve the omo-switch store")?;
        let cwd = std::env::current_dir().context("failed to read the current directory")?;
        Ok(Self::new(global, cwd, SchemaFetch::from_env()))
    }

    /// Nearest ancestor of `cwd` holding `.opencode/`.
    pub fn project_root(&self) -> Result<Option<PathBuf>> {
        Ok(find_project_root(&self.cwd)?)
    }

    pub fn require_project_root(&self) -> Result<PathBuf> {
        self.project_root()?.ok_or_else(|| {
            anyhow!("no .opencode/ directory found in parent directories; run inside a project or use --scope user")
        })
    }

    pub fn effective_type(&self, project_root: Option<&Path>) -> ConfigType {
        self.global.settings().effective_type(project_root)
    }

    /// Yes/no prompt defaulting to no.
    pub fn confirm(&self, message: &str) -> Result<bool> {
        Confirm::new(message)
            .with_default(false)
            .prompt()
            .context("Failed to get user confirmation")
    }
}
