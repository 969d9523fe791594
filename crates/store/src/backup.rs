//! Backup snapshots and their retention sweep.
//!
//! Backups are immutable copies named `<timestamp>__<original basename>`, where
//! the timestamp is ISO-8601 UTC with `:` and `.` replaced by `-`
//! (`2024-01-01T00-00-00-000Z__a.json`).

use crate::error::{Result, StoreError};
use crate::paths::ensure_dir;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const SECONDS_PER_DAY: u64 = 86_400;

const BACKUP_TIMESTAMP: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]-[minute]-[second]-[subsecond digits:3]Z"
);

/// Deletes regular files directly inside `dir` whose modification time is
/// older than `retention_days`. Returns how many files were deleted.
///
/// Best effort: a missing directory is a no-op, a file that cannot be
/// inspected or deleted is skipped, and a failure while listing the directory
/// ends the sweep with the count so far. Never fails.
pub fn clean_old_backups(dir: &Path, retention_days: u32) -> usize {
    clean_old_backups_at(dir, retention_days, SystemTime::now())
}

/// [`clean_old_backups`] with an explicit notion of "now".
pub fn clean_old_backups_at(dir: &Path, retention_days: u32, now: SystemTime) -> usize {
    let retention = Duration::from_secs(u64::from(retention_days) * SECONDS_PER_DAY);
    let cutoff = now.checked_sub(retention).unwrap_or(SystemTime::UNIX_EPOCH);

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot read backups directory");
            return 0;
        }
    };

    let mut deleted = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "backup sweep aborted");
                break;
            }
        };
        let path = entry.path();
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };
        if modified < cutoff {
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not delete old backup")
                }
            }
        }
    }

    if deleted > 0 {
        tracing::debug!(dir = %dir.display(), deleted, retention_days, "pruned old backups");
    }
    deleted
}

/// `<timestamp>__<basename>` for a backup taken at `at`.
pub fn backup_file_name(at: OffsetDateTime, basename: &str) -> String {
    let stamp = at
        .format(BACKUP_TIMESTAMP)
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("{stamp}__{basename}")
}

/// Sweeps `backups_dir` with `retention_days`, then copies `source` into it
/// under a fresh backup name. Returns `None` when `source` does not exist.
///
/// `backup_basename` overrides the basename used in the backup name.
pub fn create_backup_in(
    backups_dir: &Path,
    source: &Path,
    backup_basename: Option<&str>,
    retention_days: u32,
) -> Result<Option<PathBuf>> {
    if !source.is_file() {
        return Ok(None);
    }
    ensure_dir(backups_dir)?;
    clean_old_backups(backups_dir, retention_days);

    let basename = match backup_basename {
        Some(name) => name.to_string(),
        None => source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string()),
    };
    let target = unique_backup_path(backups_dir, OffsetDateTime::now_utc(), &basename);
    fs::copy(source, &target).map_err(|e| StoreError::io(&target, e))?;
    tracing::debug!(source = %source.display(), backup = %target.display(), "created backup");
    Ok(Some(target))
}

fn unique_backup_path(dir: &Path, at: OffsetDateTime, basename: &str) -> PathBuf {
    let first = dir.join(backup_file_name(at, basename));
    if !first.exists() {
        return first;
    }
    let stem = backup_file_name(at, "");
    let stem = stem.trim_end_matches("__");
    (1..)
        .map(|n| dir.join(format!("{stem}-{n}__{basename}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use omo_switch_test_utils::set_mtime;
    use tempfile::tempdir;
    use time::macros::datetime;

    const DAY: Duration = Duration::from_secs(SECONDS_PER_DAY);

    #[test]
    fn given_missing_dir_when_cleaning_then_returns_zero() {
        let tmp = tempdir().unwrap();
        assert_eq!(clean_old_backups(&tmp.path().join("absent"), 30), 0);
    }

    #[test]
    fn given_mixed_ages_when_cleaning_then_only_older_files_are_deleted() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        let now = SystemTime::now();

        let old = dir.join("2024-01-01T00-00-00-000Z__a.json");
        let edge = dir.join("edge.json");
        let fresh = dir.join("fresh.json");
        for path in [&old, &edge, &fresh] {
            fs::write(path, "{}").unwrap();
        }
        set_mtime(&old, now - DAY * 400).unwrap();
        set_mtime(&edge, now - DAY * 29).unwrap();
        set_mtime(&fresh, now).unwrap();

        let deleted = clean_old_backups_at(dir, 30, now);
        assert_eq!(deleted, 1);
        assert!(!old.exists());
        assert!(edge.exists());
        assert!(fresh.exists());

        let cutoff = now - DAY * 30;
        for entry in fs::read_dir(dir).unwrap() {
            let modified = entry.unwrap().metadata().unwrap().modified().unwrap();
            assert!(modified >= cutoff);
        }
    }

    #[test]
    fn given_old_subdirectory_when_cleaning_then_it_is_skipped() {
        let tmp = tempdir().unwrap();
        let sub = tmp.path().join("nested");
        fs::create_dir(&sub).unwrap();
        let inner = sub.join("old.json");
        fs::write(&inner, "{}").unwrap();
        set_mtime(&inner, SystemTime::now() - DAY * 400).unwrap();

        assert_eq!(clean_old_backups(tmp.path(), 30), 0);
        assert!(inner.exists());
    }

    #[test]
    fn zero_retention_prunes_everything_older_than_now() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("x.json");
        fs::write(&file, "{}").unwrap();
        set_mtime(&file, SystemTime::now() - Duration::from_secs(5)).unwrap();
        assert_eq!(clean_old_backups(tmp.path(), 0), 1);
    }

    #[test]
    fn backup_name_replaces_colons_and_dots() {
        let at = datetime!(2024-01-01 00:00:00.000 UTC);
        assert_eq!(
            backup_file_name(at, "a.json"),
            "2024-01-01T00-00-00-000Z__a.json"
        );
        let at = datetime!(2025-06-15 13:45:07.089 UTC);
        assert_eq!(
            backup_file_name(at, "work.jsonc"),
            "2025-06-15T13-45-07-089Z__work.jsonc"
        );
    }

    #[test]
    fn given_missing_source_when_backing_up_then_none() {
        let tmp = tempdir().unwrap();
        let result = create_backup_in(
            &tmp.path().join("backups"),
            &tmp.path().join("nope.json"),
            None,
            30,
        )
        .unwrap();
        assert!(result.is_none());
        assert!(!tmp.path().join("backups").exists());
    }

    #[test]
    fn given_source_when_backing_up_twice_then_copies_are_distinct_and_identical() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("work.json");
        fs::write(&source, b"{\n  \"k\": 1\n}").unwrap();
        let backups = tmp.path().join("backups");

        let first = create_backup_in(&backups, &source, None, 30).unwrap().unwrap();
        let second = create_backup_in(&backups, &source, None, 30).unwrap().unwrap();

        assert_ne!(first, second);
        for backup in [&first, &second] {
            assert_eq!(fs::read(backup).unwrap(), fs::read(&source).unwrap());
            let name = backup.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.ends_with("__work.json"), "{name}");
        }
    }

    #[test]
    fn given_stale_backup_when_backing_up_then_sweep_runs_first() {
        let tmp = tempdir().unwrap();
        let backups = tmp.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        let stale = backups.join("2024-01-01T00-00-00-000Z__a.json");
        fs::write(&stale, "{}").unwrap();
        set_mtime(&stale, SystemTime::now() - DAY * 90).unwrap();

        let source = tmp.path().join("a.json");
        fs::write(&source, "{}").unwrap();
        create_backup_in(&backups, &source, Some("renamed.json"), 30)
            .unwrap()
            .unwrap();

        let names: Vec<String> = fs::read_dir(&backups)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with("__renamed.json"));
    }
}
