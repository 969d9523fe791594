//! Profile store and scope resolution for `omo-switch`.
//!
//! This crate provides:
//! - Path resolution for the global store, project stores and the external
//!   tool's config files (`paths`).
//! - The user-scoped store with its `index.json` (`global`) and the
//!   project-scoped store under `.opencode/` (`project`).
//! - Global settings with per-project type override (`settings`).
//! - The single-file preset store of the slim dialect (`presets`).
//! - Backup snapshots and retention (`backup`).
//!
//! All operations are synchronous local filesystem I/O. There is no locking
//! against other processes: concurrent invocations race on the index and the
//! last writer wins.
//!
//! # Examples
//!
//! ```
//! use omo_switch_store::{GlobalStore, ProfileFiles, StoreIndex};
//! use tempfile::tempdir;
//!
//! let tmp = tempdir().unwrap();
//! let store = GlobalStore::with_root(tmp.path().join("omo-switch"));
//! store.ensure_directories().unwrap();
//! assert_eq!(store.load_index().unwrap(), StoreIndex::default());
//!
//! std::fs::write(tmp.path().join("omo-switch/configs/work.json"), "{}").unwrap();
//! let report = store.sync_profiles().unwrap();
//! assert_eq!(report.added, vec!["work".to_string()]);
//! assert!(store.config_exists("work"));
//! ```

#![deny(unsafe_code)]

pub mod backup;
pub mod dialect;
pub mod error;
pub mod fs_util;
pub mod global;
pub mod jsonc;
pub mod paths;
pub mod presets;
pub mod profile_files;
pub mod project;
pub mod settings;
pub mod types;

pub use backup::{backup_file_name, clean_old_backups, clean_old_backups_at};
pub use dialect::{open_backend, preset_manager, ProfileBackend};
pub use error::{Result, StoreError};
pub use global::{display_name_from_id, GlobalStore, SyncReport};
pub use jsonc::{parse_jsonc, parse_jsonc_object, render_applied_config, strip_json_comments};
pub use paths::{
    ensure_dir, find_existing_global_target, find_project_root, find_project_root_from_cwd,
    global_target_path, resolve_project_root, resolve_user_store_root,
};
pub use presets::{default_omos_config, PresetConfigManager};
pub use profile_files::{ConfigExtension, ProfileFiles, RawConfig};
pub use project::{load_project_rc, save_project_rc, ProjectStore};
pub use settings::SettingsManager;
pub use types::{
    CacheMeta, CacheSource, ConfigObject, ConfigType, GlobalSettings, OmosConfig,
    PresetAgentConfig, PresetConfig, Profile, ProjectRc, Scope, StoreIndex, STORE_VERSION,
};
