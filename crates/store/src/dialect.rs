//! Dialect-neutral view of "which profiles exist and which one is active".
//!
//! The `omo` dialect keeps one file per profile (global index or project
//! run-control pointer); the slim dialect keeps presets in a single file.
//! [`open_backend`] picks the implementation from the effective config type.

use crate::error::{Result, StoreError};
use crate::global::GlobalStore;
use crate::paths::{global_slim_config_path, project_backups_dir, project_slim_config_path};
use crate::presets::PresetConfigManager;
use crate::profile_files::ProfileFiles;
use crate::project::ProjectStore;
use crate::types::{ConfigType, ProjectRc, Scope};
use std::path::Path;

pub trait ProfileBackend {
    fn config_type(&self) -> ConfigType;

    fn scope(&self) -> Scope;

    /// Ids (omo) or preset names (slim) in this scope.
    fn list(&self) -> Result<Vec<String>>;

    fn active(&self) -> Result<Option<String>>;

    /// Moves the active pointer. Returns false when the backend refuses an id
    /// it does not know.
    fn set_active(&self, id: Option<&str>) -> Result<bool>;
}

impl ProfileBackend for GlobalStore {
    fn config_type(&self) -> ConfigType {
        ConfigType::Omo
    }

    fn scope(&self) -> Scope {
        Scope::User
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.load_index()?.profiles.into_iter().map(|p| p.id).collect())
    }

    fn active(&self) -> Result<Option<String>> {
        Ok(self.load_index()?.active_profile_id)
    }

    fn set_active(&self, id: Option<&str>) -> Result<bool> {
        let mut index = self.load_index()?;
        if !index.set_active(id) {
            return Ok(false);
        }
        self.save_index(&index)?;
        Ok(true)
    }
}

impl ProfileBackend for ProjectStore {
    fn config_type(&self) -> ConfigType {
        ConfigType::Omo
    }

    fn scope(&self) -> Scope {
        Scope::Project
    }

    fn list(&self) -> Result<Vec<String>> {
        self.list_profiles()
    }

    fn active(&self) -> Result<Option<String>> {
        Ok(self.load_rc().and_then(|rc| rc.active_profile_id))
    }

    /// Keeps any `type` override already in the run-control file.
    fn set_active(&self, id: Option<&str>) -> Result<bool> {
        if let Some(id) = id {
            if !self.config_exists(id) {
                return Ok(false);
            }
        }
        let mut rc: ProjectRc = self.load_rc().unwrap_or_default();
        rc.active_profile_id = id.map(str::to_string);
        self.save_rc(&rc)?;
        Ok(true)
    }
}

impl ProfileBackend for PresetConfigManager {
    fn config_type(&self) -> ConfigType {
        ConfigType::Slim
    }

    fn scope(&self) -> Scope {
        PresetConfigManager::scope(self)
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.list_presets())
    }

    fn active(&self) -> Result<Option<String>> {
        Ok(self.active_preset())
    }

    /// Accepts names that are not (yet) defined presets.
    fn set_active(&self, id: Option<&str>) -> Result<bool> {
        self.set_active_preset(id)?;
        Ok(true)
    }
}

fn require_root(project_root: Option<&Path>) -> Result<&Path> {
    project_root
        .ok_or_else(|| StoreError::resolution("project store", "no project root was found"))
}

/// Slim preset manager for `scope`, sharing the global store's settings and
/// (for user scope) its backups directory.
pub fn preset_manager(
    global: &GlobalStore,
    scope: Scope,
    project_root: Option<&Path>,
) -> Result<PresetConfigManager> {
    let settings = global.settings().clone();
    match scope {
        Scope::User => Ok(PresetConfigManager::with_paths(
            Scope::User,
            global_slim_config_path()?,
            global.backups_dir().to_path_buf(),
            settings,
        )),
        Scope::Project => {
            let root = require_root(project_root)?;
            Ok(PresetConfigManager::with_paths(
                Scope::Project,
                project_slim_config_path(root),
                project_backups_dir(root),
                settings,
            ))
        }
    }
}

/// Backend for `scope` in the dialect the global settings resolve for
/// `project_root`. Project and slim backends share the global store's settings.
pub fn open_backend(
    global: &GlobalStore,
    scope: Scope,
    project_root: Option<&Path>,
) -> Result<Box<dyn ProfileBackend>> {
    let config_type = global.settings().effective_type(project_root);
    tracing::debug!(%config_type, %scope, "opening profile backend");
    match (config_type, scope) {
        (ConfigType::Omo, Scope::User) => Ok(Box::new(global.clone())),
        (ConfigType::Omo, Scope::Project) => Ok(Box::new(ProjectStore::with_settings(
            require_root(project_root)?.to_path_buf(),
            global.settings().clone(),
        ))),
        (ConfigType::Slim, scope) => Ok(Box::new(preset_manager(global, scope, project_root)?)),
    }
}
