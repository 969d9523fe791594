//! The slim dialect: one file holding every named preset plus the active one.

use crate::backup::create_backup_in;
use crate::error::{Result, StoreError};
use crate::fs_util::{read_to_string_opt, write_json_pretty};
use crate::jsonc::strip_json_comments;
use crate::paths::{
    global_slim_config_path, project_backups_dir, project_slim_config_path,
    resolve_user_store_root, BACKUPS_DIR, SLIM_CONFIG_STEM,
};
use crate::settings::SettingsManager;
use crate::types::{OmosConfig, PresetConfig, Scope};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Preset set materialised on first use. Callers always receive a clone, so
/// mutating a loaded config never reaches this value.
static DEFAULT_OMOS_CONFIG: LazyLock<OmosConfig> = LazyLock::new(|| {
    let mut presets = IndexMap::new();
    presets.insert(
        "zen-free".to_string(),
        PresetConfig::uniform("opencode/big-pickle"),
    );
    OmosConfig {
        preset: Some("zen-free".to_string()),
        presets,
        ..Default::default()
    }
});

/// A deep copy of the built-in default preset set.
pub fn default_omos_config() -> OmosConfig {
    DEFAULT_OMOS_CONFIG.clone()
}

#[derive(Debug, Clone)]
pub struct PresetConfigManager {
    scope: Scope,
    target_path: PathBuf,
    backups_dir: PathBuf,
    settings: SettingsManager,
}

impl PresetConfigManager {
    /// Manager for `scope`. Project scope requires `project_root`.
    pub fn for_scope(scope: Scope, project_root: Option<&Path>) -> Result<Self> {
        match scope {
            Scope::Project => {
                let root = project_root.ok_or_else(|| {
                    StoreError::resolution(
                        "slim config path",
                        "a project root is required for project scope",
                    )
                })?;
                Ok(Self::with_paths(
                    scope,
                    project_slim_config_path(root),
                    project_backups_dir(root),
                    SettingsManager::new()?,
                ))
            }
            Scope::User => Ok(Self::with_paths(
                scope,
                global_slim_config_path()?,
                resolve_user_store_root()?.join(BACKUPS_DIR),
                SettingsManager::new()?,
            )),
        }
    }

    pub fn with_paths(
        scope: Scope,
        target_path: PathBuf,
        backups_dir: PathBuf,
        settings: SettingsManager,
    ) -> Self {
        Self {
            scope,
            target_path,
            backups_dir,
            settings,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn config_exists(&self) -> bool {
        self.target_path.is_file()
    }

    /// The config file, or `None` when it is absent or does not parse.
    pub fn load_config(&self) -> Option<OmosConfig> {
        match self.read_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "slim config ignored");
                None
            }
        }
    }

    /// The config file, `None` when it is absent. A file that exists but does
    /// not parse is an error, so callers that rewrite it never clobber it.
    fn read_config(&self) -> Result<Option<OmosConfig>> {
        let Some(text) = read_to_string_opt(&self.target_path)? else {
            return Ok(None);
        };
        serde_json::from_str(&strip_json_comments(&text))
            .map(Some)
            .map_err(|source| StoreError::InvalidConfig {
                path: self.target_path.clone(),
                source,
            })
    }

    /// The config file, writing the default preset set first if there is none.
    pub fn load_or_create_config(&self) -> Result<OmosConfig> {
        if let Some(existing) = self.read_config()? {
            return Ok(existing);
        }
        tracing::debug!(path = %self.target_path.display(), "writing default slim config");
        let config = default_omos_config();
        self.save_config(&config)?;
        Ok(config)
    }

    /// Writes plain pretty JSON, even when the target path ends in `.jsonc`.
    pub fn save_config(&self, config: &OmosConfig) -> Result<()> {
        write_json_pretty(&self.target_path, config, "slim config")
    }

    pub fn list_presets(&self) -> Vec<String> {
        self.load_config()
            .map(|c| c.presets.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn active_preset(&self) -> Option<String> {
        self.load_config()?.preset
    }

    /// Sets the `preset` field. The name is not checked against `presets`.
    pub fn set_active_preset(&self, name: Option<&str>) -> Result<()> {
        let mut config = self.load_or_create_config()?;
        config.preset = name.map(str::to_string);
        self.save_config(&config)
    }

    pub fn preset(&self, name: &str) -> Option<PresetConfig> {
        self.load_config()?.presets.shift_remove(name)
    }

    /// Adds or overwrites preset `name`.
    pub fn add_preset(&self, name: &str, preset: PresetConfig) -> Result<()> {
        let mut config = self.load_or_create_config()?;
        config.presets.insert(name.to_string(), preset);
        self.save_config(&config)
    }

    /// Removes preset `name`; false when the file or the preset is missing.
    /// A file that does not parse is an error.
    pub fn remove_preset(&self, name: &str) -> Result<bool> {
        let Some(mut config) = self.read_config()? else {
            return Ok(false);
        };
        if config.presets.shift_remove(name).is_none() {
            return Ok(false);
        }
        self.save_config(&config)?;
        Ok(true)
    }

    /// How many agent roles preset `name` configures (0 if it does not exist).
    pub fn preset_agent_count(&self, name: &str) -> usize {
        self.preset(name).map(|p| p.agent_count()).unwrap_or(0)
    }

    /// Prunes old backups, then snapshots the config file as
    /// `<timestamp>__oh-my-opencode-slim.json`.
    pub fn create_backup(&self) -> Result<Option<PathBuf>> {
        let basename = format!("{SLIM_CONFIG_STEM}.json");
        create_backup_in(
            &self.backups_dir,
            &self.target_path,
            Some(&basename),
            self.settings.load_settings().backup_retention_days,
        )
    }
}
