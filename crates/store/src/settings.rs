//! Global settings (`settings.json`) and effective config type resolution.
//!
//! Settings are regenerable preferences: an absent or malformed file yields
//! defaults instead of an error.

use crate::error::Result;
use crate::fs_util::{read_to_string_opt, write_json_pretty};
use crate::paths::resolve_user_store_root;
use crate::project::load_project_rc;
use crate::types::{ConfigType, GlobalSettings};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    /// Settings file inside the resolved global store root.
    pub fn new() -> Result<Self> {
        Ok(Self::in_store(&resolve_user_store_root()?))
    }

    /// Settings file inside an explicit store root.
    pub fn in_store(store_root: &Path) -> Self {
        Self::at(store_root.join(SETTINGS_FILE))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn settings_path(&self) -> &Path {
        &self.path
    }

    /// Current settings. Each field falls back to its default on its own when
    /// missing or ill-typed; a missing or unparsable file yields all defaults.
    pub fn load_settings(&self) -> GlobalSettings {
        let defaults = GlobalSettings::default();
        let text = match read_to_string_opt(&self.path) {
            Ok(Some(text)) => text,
            Ok(None) => return defaults,
            Err(e) => {
                tracing::warn!(error = %e, "settings unreadable, using defaults");
                return defaults;
            }
        };
        let fields = match serde_json::from_str::<Map<String, Value>>(&text) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "malformed settings file, using defaults"
                );
                return defaults;
            }
        };
        GlobalSettings {
            active_type: settings_field(&fields, "activeType").unwrap_or(defaults.active_type),
            backup_retention_days: settings_field(&fields, "backupRetentionDays")
                .unwrap_or(defaults.backup_retention_days),
        }
    }

    pub fn save_settings(&self, settings: &GlobalSettings) -> Result<()> {
        write_json_pretty(&self.path, settings, "settings")
    }

    /// Config type in effect: the project's run-control `type` if set, else the
    /// global `activeType`.
    pub fn effective_type(&self, project_root: Option<&Path>) -> ConfigType {
        if let Some(config_type) = project_root
            .and_then(load_project_rc)
            .and_then(|rc| rc.config_type)
        {
            return config_type;
        }
        self.load_settings().active_type
    }

    /// Whether [`Self::effective_type`] comes from the project's run-control file.
    pub fn is_project_override(&self, project_root: Option<&Path>) -> bool {
        project_root
            .and_then(load_project_rc)
            .is_some_and(|rc| rc.config_type.is_some())
    }

    pub fn set_active_type(&self, config_type: ConfigType) -> Result<()> {
        let mut settings = self.load_settings();
        settings.active_type = config_type;
        self.save_settings(&settings)
    }

    pub fn set_backup_retention_days(&self, days: u32) -> Result<()> {
        let mut settings = self.load_settings();
        settings.backup_retention_days = days;
        self.save_settings(&settings)
    }
}

/// One settings field; a missing or ill-typed value yields `None` without
/// affecting the others.
fn settings_field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(field = key, error = %e, "invalid settings value, using default");
            None
        }
    }
}
