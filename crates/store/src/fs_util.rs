//! Small filesystem helpers shared by the stores.

use crate::error::{Result, StoreError};
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `contents` to `path` via a temp file in the same directory and a
/// rename, so readers see either the old file or the complete new one.
/// Parent directories are created as needed.
///
/// An existing file keeps its permissions; a new one gets `0644` minus the
/// process umask, like a plain `fs::write`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut tmp = new_temp_file(parent)?;
    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    if let Some(permissions) = existing {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| StoreError::io(tmp.path(), e))?;
    }
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

#[cfg(unix)]
fn new_temp_file(dir: &Path) -> Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    // NamedTempFile defaults to 0600, which would stick after the rename.
    tempfile::Builder::new()
        .permissions(fs::Permissions::from_mode(0o644))
        .tempfile_in(dir)
        .map_err(|e| StoreError::io(dir, e))
}

#[cfg(not(unix))]
fn new_temp_file(dir: &Path) -> Result<NamedTempFile> {
    NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))
}

/// Serializes `value` as 2-space pretty JSON and writes it atomically.
pub fn write_json_pretty<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    what: &'static str,
) -> Result<()> {
    let text = to_pretty_json(value, what)?;
    write_atomic(path, text.as_bytes())
}

pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T, what: &'static str) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize { what, source })
}

/// Reads a UTF-8 file, returning `None` when it does not exist.
pub fn read_to_string_opt(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Removes a file, returning whether something was deleted.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
