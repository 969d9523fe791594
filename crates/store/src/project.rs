//! The project-scoped store under `<project root>/.opencode/`.
//!
//! There is no index: the profile set is whatever `omo-configs/` contains, and
//! the active pointer lives in the run-control file `.omorc`.

use crate::error::Result;
use crate::fs_util::{read_to_string_opt, to_pretty_json, write_atomic, write_json_pretty};
use crate::paths::{
    ensure_dir, project_backups_dir, project_configs_dir, project_marker_dir, project_rc_path,
    project_target_path,
};
use crate::profile_files::{ConfigExtension, ProfileFiles};
use crate::settings::SettingsManager;
use crate::types::{ConfigObject, ProjectRc};
use std::path::{Path, PathBuf};

const GITIGNORE_BACKUPS_ENTRY: &str = "backups/";

/// Reads `<root>/.opencode/.omorc`. Absent, unreadable and malformed files
/// all read as `None`.
pub fn load_project_rc(project_root: &Path) -> Option<ProjectRc> {
    let path = project_rc_path(project_root);
    let text = match read_to_string_opt(&path) {
        Ok(text) => text?,
        Err(e) => {
            tracing::warn!(error = %e, "run-control file unreadable");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(rc) => Some(rc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "malformed run-control file ignored");
            None
        }
    }
}

pub fn save_project_rc(project_root: &Path, rc: &ProjectRc) -> Result<()> {
    write_json_pretty(&project_rc_path(project_root), rc, "run-control file")
}

/// Returns `content` with a `backups/` line appended, or `None` when an
/// equivalent line is already present.
fn gitignore_with_backups(content: &str) -> Option<String> {
    let present = content
        .lines()
        .map(str::trim)
        .any(|line| line == GITIGNORE_BACKUPS_ENTRY || line == "backups");
    if present {
        return None;
    }
    let separator = if content.ends_with('\n') { "" } else { "\n" };
    Some(format!("{content}{separator}{GITIGNORE_BACKUPS_ENTRY}\n"))
}

#[derive(Debug, Clone)]
pub struct ProjectStore {
    project_root: PathBuf,
    configs_dir: PathBuf,
    backups_dir: PathBuf,
    settings: SettingsManager,
}

impl ProjectStore {
    /// Store for `project_root`, reading retention from the global settings.
    pub fn new(project_root: PathBuf) -> Result<Self> {
        Ok(Self::with_settings(project_root, SettingsManager::new()?))
    }

    pub fn with_settings(project_root: PathBuf, settings: SettingsManager) -> Self {
        Self {
            configs_dir: project_configs_dir(&project_root),
            backups_dir: project_backups_dir(&project_root),
            project_root,
            settings,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// File the `omo` dialect applies into for this project.
    pub fn target_path(&self) -> PathBuf {
        project_target_path(&self.project_root)
    }

    pub fn rc_path(&self) -> PathBuf {
        project_rc_path(&self.project_root)
    }

    /// Creates `.opencode/`, its profile and backups directories, and makes
    /// sure `.opencode/.gitignore` lists `backups/`.
    pub fn ensure_directories(&self) -> Result<()> {
        ensure_dir(&project_marker_dir(&self.project_root))?;
        ensure_dir(&self.configs_dir)?;
        ensure_dir(&self.backups_dir)?;
        self.ensure_gitignore()
    }

    fn ensure_gitignore(&self) -> Result<()> {
        let path = project_marker_dir(&self.project_root).join(".gitignore");
        let updated = match read_to_string_opt(&path)? {
            Some(content) => gitignore_with_backups(&content),
            None => Some(format!("{GITIGNORE_BACKUPS_ENTRY}\n")),
        };
        if let Some(content) = updated {
            write_atomic(&path, content.as_bytes())?;
        }
        Ok(())
    }

    pub fn load_rc(&self) -> Option<ProjectRc> {
        load_project_rc(&self.project_root)
    }

    pub fn save_rc(&self, rc: &ProjectRc) -> Result<()> {
        save_project_rc(&self.project_root, rc)
    }

    /// Profile ids present in the project's profile directory.
    pub fn list_profiles(&self) -> Result<Vec<String>> {
        self.list_profile_ids()
    }

    pub fn save_profile_config_raw(
        &self,
        id: &str,
        content: &str,
        ext: ConfigExtension,
    ) -> Result<PathBuf> {
        self.ensure_directories()?;
        self.write_profile_file(id, content, ext)
    }

    pub fn save_profile_config(&self, id: &str, config: &ConfigObject) -> Result<PathBuf> {
        let text = to_pretty_json(config, "profile config")?;
        self.save_profile_config_raw(id, &text, ConfigExtension::Json)
    }

    /// Deletes the resolved config file for `id`. The run-control pointer is
    /// not touched; callers clear it separately when it named `id`.
    pub fn delete_profile_config(&self, id: &str) -> Result<bool> {
        self.delete_profile_file(id)
    }
}

impl ProfileFiles for ProjectStore {
    fn configs_dir(&self) -> &Path {
        &self.configs_dir
    }

    fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    fn retention_days(&self) -> u32 {
        self.settings.load_settings().backup_retention_days
    }
}
