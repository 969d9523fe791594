//! Canonical on-disk locations for the global store, project stores and the
//! external tool's own config files.
//!
//! Global locations are a pure function of the environment:
//! `$XDG_CONFIG_HOME` (or `~/.config`) joined with `omo-switch/`.

use crate::error::{Result, StoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory name of the global store under the config home.
pub const STORE_DIR_NAME: &str = "omo-switch";
/// Marker directory that identifies a project root.
pub const PROJECT_MARKER_DIR: &str = ".opencode";
/// Project profile directory, relative to the marker directory.
pub const PROJECT_CONFIGS_DIR: &str = "omo-configs";
/// Project run-control file, relative to the marker directory.
pub const PROJECT_RC_FILE: &str = ".omorc";
/// Backups directory name, used in both scopes.
pub const BACKUPS_DIR: &str = "backups";
/// File the `omo` dialect is applied into.
pub const OMO_TARGET_FILE: &str = "oh-my-opencode.jsonc";
/// Stem of the `omo` target file.
pub const OMO_TARGET_STEM: &str = "oh-my-opencode";
/// Stem of the slim dialect's config file.
pub const SLIM_CONFIG_STEM: &str = "oh-my-opencode-slim";

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| StoreError::resolution("home directory", "not found"))
}

/// `$XDG_CONFIG_HOME`, or `~/.config` when unset or empty.
pub fn config_home() -> Result<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg));
    }
    Ok(home_dir()?.join(".config"))
}

/// Root of the global store. No I/O is performed.
pub fn resolve_user_store_root() -> Result<PathBuf> {
    Ok(config_home()?.join(STORE_DIR_NAME))
}

/// The external tool's own config directory (`<config home>/opencode`).
pub fn opencode_config_dir() -> Result<PathBuf> {
    Ok(config_home()?.join("opencode"))
}

/// Where the `omo` dialect writes the applied profile in user scope.
pub fn global_target_path() -> Result<PathBuf> {
    Ok(opencode_config_dir()?.join(OMO_TARGET_FILE))
}

/// An existing user-scope `omo` target, `.jsonc` preferred over `.json`.
pub fn find_existing_global_target() -> Result<Option<PathBuf>> {
    Ok(find_with_extension(&opencode_config_dir()?, OMO_TARGET_STEM))
}

/// Slim dialect config file for user scope.
pub fn global_slim_config_path() -> Result<PathBuf> {
    Ok(slim_config_in(&opencode_config_dir()?))
}

/// Slim dialect config file for a project.
pub fn project_slim_config_path(project_root: &Path) -> PathBuf {
    slim_config_in(&project_marker_dir(project_root))
}

fn slim_config_in(dir: &Path) -> PathBuf {
    find_with_extension(dir, SLIM_CONFIG_STEM)
        .unwrap_or_else(|| dir.join(format!("{SLIM_CONFIG_STEM}.json")))
}

/// `<dir>/<stem>.jsonc` if it exists, else `<dir>/<stem>.json` if it exists.
pub(crate) fn find_with_extension(dir: &Path, stem: &str) -> Option<PathBuf> {
    [".jsonc", ".json"]
        .iter()
        .map(|ext| dir.join(format!("{stem}{ext}")))
        .find(|candidate| candidate.is_file())
}

pub fn project_marker_dir(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_MARKER_DIR)
}

pub fn project_configs_dir(project_root: &Path) -> PathBuf {
    project_marker_dir(project_root).join(PROJECT_CONFIGS_DIR)
}

pub fn project_rc_path(project_root: &Path) -> PathBuf {
    project_marker_dir(project_root).join(PROJECT_RC_FILE)
}

pub fn project_target_path(project_root: &Path) -> PathBuf {
    project_marker_dir(project_root).join(OMO_TARGET_FILE)
}

pub fn project_backups_dir(project_root: &Path) -> PathBuf {
    project_marker_dir(project_root).join(BACKUPS_DIR)
}

/// Walks from `start_dir` up to the filesystem root and returns the first
/// directory that contains the project marker directory.
///
/// Permission errors count as "marker absent" for that level. Any other
/// filesystem error aborts the walk.
pub fn find_project_root(start_dir: &Path) -> Result<Option<PathBuf>> {
    for dir in start_dir.ancestors() {
        let marker = dir.join(PROJECT_MARKER_DIR);
        match fs::metadata(&marker) {
            Ok(meta) if meta.is_dir() => {
                tracing::debug!(root = %dir.display(), "found project root");
                return Ok(Some(dir.to_path_buf()));
            }
            Ok(_) => continue,
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::NotADirectory
                ) =>
            {
                continue
            }
            Err(err) => {
                return Err(StoreError::resolution(
                    "project root",
                    format!("{}: {err}", marker.display()),
                ))
            }
        }
    }
    Ok(None)
}

/// Project root above the current working directory, if any.
pub fn find_project_root_from_cwd() -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir()
        .map_err(|e| StoreError::resolution("current directory", e.to_string()))?;
    find_project_root(&cwd)
}

/// The project root containing `start_dir`, or `start_dir` itself when none
/// exists yet (for commands that are about to create one).
pub fn resolve_project_root(start_dir: &Path) -> Result<PathBuf> {
    Ok(find_project_root(start_dir)?.unwrap_or_else(|| start_dir.to_path_buf()))
}

/// Creates `path` and its parents if absent. Idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))
}
