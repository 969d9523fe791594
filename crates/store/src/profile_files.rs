//! Per-profile config files, shared by the global and project stores.
//!
//! A profile `id` maps to `<configs dir>/<id>.jsonc` or `<id>.json`; the
//! `.jsonc` file wins when both exist.

use crate::backup::create_backup_in;
use crate::error::{Result, StoreError};
use crate::fs_util::{read_to_string_opt, remove_file_if_exists, write_atomic};
use crate::jsonc::parse_jsonc_object;
use crate::paths::find_with_extension;
use crate::types::ConfigObject;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File extension a profile config is stored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigExtension {
    Json,
    /// Comment-preserving variant.
    Jsonc,
}

impl ConfigExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigExtension::Json => ".json",
            ConfigExtension::Jsonc => ".jsonc",
        }
    }

    /// Extension of `path`, if it is one a profile can use.
    pub fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(ConfigExtension::Json),
            "jsonc" => Some(ConfigExtension::Jsonc),
            _ => None,
        }
    }
}

/// Raw content of a resolved profile file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConfig {
    pub path: PathBuf,
    pub content: String,
}

/// Profile ids present in `dir` as `.json`/`.jsonc` files, deduplicated and
/// sorted. A missing directory yields an empty list.
pub fn list_profile_ids(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(dir, e)),
    };

    let mut ids = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let stem = name
            .strip_suffix(".jsonc")
            .or_else(|| name.strip_suffix(".json"));
        if let Some(stem) = stem.filter(|s| !s.is_empty()) {
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                ids.insert(stem.to_string());
            }
        }
    }
    Ok(ids.into_iter().collect())
}

/// The file contract both stores expose for profile configs.
pub trait ProfileFiles {
    /// Directory holding `<id>.json` / `<id>.jsonc`.
    fn configs_dir(&self) -> &Path;

    /// Directory backups of this scope go into.
    fn backups_dir(&self) -> &Path;

    /// Backup retention currently configured, in days.
    fn retention_days(&self) -> u32;

    /// Resolved config file for `id`, `.jsonc` preferred.
    fn profile_config_path(&self, id: &str) -> Option<PathBuf> {
        find_with_extension(self.configs_dir(), id)
    }

    fn config_exists(&self, id: &str) -> bool {
        self.profile_config_path(id).is_some()
    }

    fn profile_config_raw(&self, id: &str) -> Result<Option<RawConfig>> {
        let Some(path) = self.profile_config_path(id) else {
            return Ok(None);
        };
        Ok(read_to_string_opt(&path)?.map(|content| RawConfig { path, content }))
    }

    /// Parsed config for `id`; comments in `.jsonc` files are ignored.
    fn profile_config(&self, id: &str) -> Result<Option<ConfigObject>> {
        let Some(raw) = self.profile_config_raw(id)? else {
            return Ok(None);
        };
        parse_jsonc_object(&raw.content)
            .map(Some)
            .map_err(|source| StoreError::InvalidConfig {
                path: raw.path,
                source,
            })
    }

    fn list_profile_ids(&self) -> Result<Vec<String>> {
        list_profile_ids(self.configs_dir())
    }

    /// Writes `content` verbatim to `<id><ext>`. A sibling with the other
    /// extension is left in place.
    fn write_profile_file(&self, id: &str, content: &str, ext: ConfigExtension) -> Result<PathBuf> {
        let path = self.configs_dir().join(format!("{id}{}", ext.as_str()));
        write_atomic(&path, content.as_bytes())?;
        Ok(path)
    }

    /// Deletes the resolved config file for `id`; returns whether one existed.
    fn delete_profile_file(&self, id: &str) -> Result<bool> {
        match self.profile_config_path(id) {
            Some(path) => remove_file_if_exists(&path),
            None => Ok(false),
        }
    }

    /// Prunes old backups, then snapshots `config_path`. `None` if the file
    /// does not exist.
    fn create_backup(&self, config_path: &Path) -> Result<Option<PathBuf>> {
        create_backup_in(self.backups_dir(), config_path, None, self.retention_days())
    }
}
