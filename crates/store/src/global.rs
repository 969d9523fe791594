//! The user-scoped store: `index.json` plus one config file per profile.
//!
//! Layout under the store root (`$XDG_CONFIG_HOME/omo-switch`):
//!
//! ```text
//! index.json
//! settings.json
//! configs/<id>.json | <id>.jsonc
//! cache/schema/
//! backups/
//! ```

use crate::error::{Result, StoreError};
use crate::fs_util::{read_to_string_opt, write_atomic, write_json_pretty};
use crate::paths::{ensure_dir, resolve_user_store_root, BACKUPS_DIR};
use crate::profile_files::{ConfigExtension, ProfileFiles};
use crate::settings::SettingsManager;
use crate::types::{now_timestamp, CacheMeta, CacheSource, ConfigObject, Profile, StoreIndex};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "index.json";
pub const CACHE_META_FILE: &str = "meta.json";

/// Outcome of [`GlobalStore::sync_profiles`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Ids adopted into the index by this run.
    pub added: Vec<String>,
    /// Ids whose files were already indexed.
    pub existing: Vec<String>,
}

/// Display name for a profile adopted from a bare file: first character
/// upper-cased, every `-` turned into a space.
pub fn display_name_from_id(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => {
            let rest: String = chars.collect();
            format!("{}{}", first.to_uppercase(), rest.replace('-', " "))
        }
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct GlobalStore {
    root: PathBuf,
    index_path: PathBuf,
    configs_dir: PathBuf,
    cache_schema_dir: PathBuf,
    backups_dir: PathBuf,
    settings: SettingsManager,
}

impl GlobalStore {
    /// Store rooted at the resolved user store root.
    pub fn new() -> Result<Self> {
        Ok(Self::with_root(resolve_user_store_root()?))
    }

    /// Store rooted at an explicit directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            index_path: root.join(INDEX_FILE),
            configs_dir: root.join("configs"),
            cache_schema_dir: root.join("cache").join("schema"),
            backups_dir: root.join(BACKUPS_DIR),
            settings: SettingsManager::in_store(&root),
            root,
        }
    }

    pub fn store_root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn cache_schema_dir(&self) -> &Path {
        &self.cache_schema_dir
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    /// Creates the store root, `configs/`, `cache/schema/` and `backups/`.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.root,
            &self.configs_dir,
            &self.cache_schema_dir,
            &self.backups_dir,
        ] {
            ensure_dir(dir)?;
        }
        Ok(())
    }

    /// Reads the index. An absent file yields a fresh default index; a file
    /// that does not parse is a [`StoreError::Corruption`].
    pub fn load_index(&self) -> Result<StoreIndex> {
        let Some(text) = read_to_string_opt(&self.index_path)? else {
            return Ok(StoreIndex::default());
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Corruption {
            path: self.index_path.clone(),
            source,
        })
    }

    pub fn save_index(&self, index: &StoreIndex) -> Result<()> {
        write_json_pretty(&self.index_path, index, "store index")
    }

    /// Writes `config` as pretty JSON to `configs/<id>.json`. An existing
    /// `<id>.jsonc` is not removed and keeps taking precedence on reads.
    pub fn save_profile_config(&self, id: &str, config: &ConfigObject) -> Result<PathBuf> {
        let text = crate::fs_util::to_pretty_json(config, "profile config")?;
        self.write_profile_file(id, &text, ConfigExtension::Json)
    }

    pub fn save_profile_config_raw(
        &self,
        id: &str,
        content: &str,
        ext: ConfigExtension,
    ) -> Result<PathBuf> {
        self.write_profile_file(id, content, ext)
    }

    /// Writes a cached asset plus its `meta.json` sidecar into `dir`.
    pub fn save_cache_file(
        &self,
        dir: &Path,
        file_name: &str,
        content: &[u8],
        source: CacheSource,
        extra: Map<String, Value>,
    ) -> Result<PathBuf> {
        let path = dir.join(file_name);
        write_atomic(&path, content)?;
        let meta = CacheMeta {
            source,
            updated_at: now_timestamp(),
            extra,
        };
        write_json_pretty(&dir.join(CACHE_META_FILE), &meta, "cache meta")?;
        Ok(path)
    }

    /// The `meta.json` sidecar of a cache dir, if present and readable.
    pub fn load_cache_meta(&self, dir: &Path) -> Option<CacheMeta> {
        let text = read_to_string_opt(&dir.join(CACHE_META_FILE)).ok()??;
        serde_json::from_str(&text).ok()
    }

    /// Adopts config files that have no index entry yet. The index is written
    /// only when something was added.
    pub fn sync_profiles(&self) -> Result<SyncReport> {
        let mut index = self.load_index()?;
        let known: HashSet<String> = index.profiles.iter().map(|p| p.id.clone()).collect();
        let mut report = SyncReport::default();

        for id in self.list_profile_ids()? {
            if known.contains(&id) {
                report.existing.push(id);
                continue;
            }
            let name = display_name_from_id(&id);
            index
                .profiles
                .push(Profile::new(id.clone(), name, ConfigObject::new()));
            report.added.push(id);
        }

        if !report.added.is_empty() {
            tracing::info!(added = ?report.added, "adopted profile files into index");
            self.save_index(&index)?;
        }
        Ok(report)
    }

    /// Removes profile `id`. The index (including a reset of the active
    /// pointer) is persisted before the config file is deleted, so a crash in
    /// between leaves an orphaned file rather than a dangling index entry.
    /// Returns false, without writing anything, when `id` is not indexed.
    pub fn delete_profile(&self, id: &str) -> Result<bool> {
        let mut index = self.load_index()?;
        let Some(position) = index.profiles.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        index.profiles.remove(position);
        if index.active_profile_id.as_deref() == Some(id) {
            index.active_profile_id = None;
        }
        self.save_index(&index)?;
        self.delete_profile_file(id)?;
        tracing::debug!(id, "deleted global profile");
        Ok(true)
    }
}

impl ProfileFiles for GlobalStore {
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
