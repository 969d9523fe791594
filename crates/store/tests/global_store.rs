//! Integration tests for the user-scoped store.

use anyhow::Result;
use omo_switch_store::{
    ConfigExtension, ConfigObject, GlobalStore, Profile, ProfileFiles, StoreError, StoreIndex,
};
use omo_switch_test_utils::{set_mtime, TestFixture};
use serde_json::json;
use std::fs;
use std::time::{Duration, SystemTime};

fn store(fixture: &TestFixture) -> GlobalStore {
    GlobalStore::with_root(fixture.store_root.clone())
}

fn config(value: serde_json::Value) -> ConfigObject {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn given_empty_store_when_loading_index_then_fresh_default() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);

    let index = store.load_index()?;
    assert_eq!(index.store_version, "1.0.0");
    assert_eq!(index.active_profile_id, None);
    assert!(index.profiles.is_empty());
    assert!(!store.index_path().exists(), "loading must not create the index");
    Ok(())
}

#[test]
fn given_ensure_directories_when_called_twice_then_layout_exists() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;
    store.ensure_directories()?;

    for dir in ["configs", "cache/schema", "backups"] {
        assert!(fixture.store_root.join(dir).is_dir(), "{dir} missing");
    }
    Ok(())
}

#[test]
fn given_saved_index_when_loading_then_round_trips() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;

    let mut index = StoreIndex::default();
    index.profiles.push(Profile::new(
        "work",
        "Work",
        config(json!({"agents": {"oracle": {"model": "a/b"}}, "z": 1, "a": 2})),
    ));
    index.profiles.push(Profile::new("home", "Home", ConfigObject::new()));
    index.active_profile_id = Some("home".into());

    store.save_index(&index)?;
    assert_eq!(store.load_index()?, index);

    // Stable 2-space indentation, field names as the file format expects.
    let text = fs::read_to_string(store.index_path())?;
    assert!(text.starts_with("{\n  \"storeVersion\": \"1.0.0\",\n  \"activeProfileId\": \"home\""));
    Ok(())
}

#[test]
fn given_malformed_index_when_loading_then_corruption_error() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;
    fs::write(store.index_path(), "{ \"profiles\": [ ")?;

    let err = store.load_index().unwrap_err();
    assert!(err.is_corruption(), "unexpected error: {err}");
    assert!(matches!(err, StoreError::Corruption { .. }));

    // The broken file is left for the user to inspect.
    assert_eq!(fs::read_to_string(store.index_path())?, "{ \"profiles\": [ ");
    Ok(())
}

#[test]
fn given_both_extensions_when_resolving_path_then_jsonc_is_preferred() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    fixture.write(&fixture.global_config_file("work", "json"), "{\"from\": \"json\"}")?;
    assert_eq!(
        store.profile_config_path("work"),
        Some(fixture.global_config_file("work", "json"))
    );

    fixture.write(
        &fixture.global_config_file("work", "jsonc"),
        "// note\n{\"from\": \"jsonc\"}",
    )?;
    assert_eq!(
        store.profile_config_path("work"),
        Some(fixture.global_config_file("work", "jsonc"))
    );

    let raw = store.profile_config_raw("work")?.expect("raw config");
    assert!(raw.content.starts_with("// note"));
    assert_eq!(store.profile_config("work")?, Some(config(json!({"from": "jsonc"}))));

    assert_eq!(store.profile_config_path("absent"), None);
    assert_eq!(store.profile_config_raw("absent")?, None);
    Ok(())
}

#[test]
fn given_jsonc_sibling_when_saving_json_then_jsonc_is_kept() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;
    store.save_profile_config_raw("work", "{\"v\": 1}", ConfigExtension::Jsonc)?;

    let written = store.save_profile_config("work", &config(json!({"v": 2})))?;
    assert_eq!(written, fixture.global_config_file("work", "json"));
    assert_eq!(fs::read_to_string(&written)?, "{\n  \"v\": 2\n}");
    assert!(fixture.global_config_file("work", "jsonc").exists());
    assert_eq!(store.profile_config("work")?, Some(config(json!({"v": 1}))));
    Ok(())
}

#[test]
fn given_unparsable_profile_when_reading_parsed_then_invalid_config() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    fixture.write(&fixture.global_config_file("bad", "json"), "not json")?;
    let err = store.profile_config("bad").unwrap_err();
    assert!(matches!(err, StoreError::InvalidConfig { .. }));
    Ok(())
}

#[test]
fn given_orphan_files_when_syncing_twice_then_second_run_adds_nothing() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;

    let mut index = StoreIndex::default();
    index.profiles.push(Profile::new("known", "Known", ConfigObject::new()));
    store.save_index(&index)?;

    fixture.write(&fixture.global_config_file("known", "json"), "{}")?;
    fixture.write(&fixture.global_config_file("my-new-profile", "jsonc"), "{}")?;
    fixture.write(&fixture.global_config_file("my-new-profile", "json"), "{}")?;
    fixture.write(&fixture.global_config_file("alpha", "json"), "{}")?;

    let first = store.sync_profiles()?;
    assert_eq!(first.added, vec!["alpha", "my-new-profile"]);
    assert_eq!(first.existing, vec!["known"]);

    let index = store.load_index()?;
    let adopted = index.find("my-new-profile").expect("adopted");
    assert_eq!(adopted.name, "My new profile");
    assert!(adopted.config.is_empty());

    let second = store.sync_profiles()?;
    assert!(second.added.is_empty());
    for id in &first.added {
        assert!(second.existing.contains(id));
    }
    Ok(())
}

#[test]
fn given_nothing_new_when_syncing_then_index_is_not_written() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;

    let report = store.sync_profiles()?;
    assert!(report.added.is_empty());
    assert!(!store.index_path().exists());
    Ok(())
}

#[test]
fn given_unknown_id_when_deleting_then_false_and_index_unchanged() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;

    let mut index = StoreIndex::default();
    index.profiles.push(Profile::new("a", "A", ConfigObject::new()));
    index.active_profile_id = Some("a".into());
    store.save_index(&index)?;
    let before = fs::read_to_string(store.index_path())?;

    assert!(!store.delete_profile("missing")?);
    assert_eq!(fs::read_to_string(store.index_path())?, before);
    assert_eq!(store.load_index()?, index);
    Ok(())
}

#[test]
fn given_active_profile_when_deleting_then_pointer_resets_and_file_is_removed() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;

    let mut index = StoreIndex::default();
    index.profiles.push(Profile::new("a", "A", ConfigObject::new()));
    index.profiles.push(Profile::new("b", "B", ConfigObject::new()));
    index.active_profile_id = Some("a".into());
    store.save_index(&index)?;
    store.save_profile_config("a", &ConfigObject::new())?;

    assert!(store.delete_profile("a")?);

    let index = store.load_index()?;
    assert_eq!(index.active_profile_id, None);
    assert_eq!(index.profiles.len(), 1);
    assert_eq!(index.profiles[0].id, "b");
    assert!(!fixture.global_config_file("a", "json").exists());
    Ok(())
}

#[test]
fn given_inactive_profile_when_deleting_then_pointer_is_kept() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;

    let mut index = StoreIndex::default();
    index.profiles.push(Profile::new("a", "A", ConfigObject::new()));
    index.profiles.push(Profile::new("b", "B", ConfigObject::new()));
    index.active_profile_id = Some("b".into());
    store.save_index(&index)?;

    // No config file on disk: deletion still succeeds.
    assert!(store.delete_profile("a")?);
    assert_eq!(store.load_index()?.active_profile_id.as_deref(), Some("b"));
    Ok(())
}

#[test]
fn given_missing_config_when_backing_up_then_none() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;
    let missing = fixture.global_config_file("ghost", "json");
    assert!(store.create_backup(&missing)?.is_none());
    Ok(())
}

#[test]
fn given_retention_setting_when_backing_up_then_old_backups_are_pruned() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = store(&fixture);
    store.ensure_directories()?;
    store.settings().set_backup_retention_days(7)?;

    let backups = fixture.store_root.join("backups");
    let ten_days_old = backups.join("2024-01-01T00-00-00-000Z__a.json");
    fs::write(&ten_days_old, "{}")?;
    set_mtime(
        &ten_days_old,
        SystemTime::now() - Duration::from_secs(86_400 * 10),
    )?;

    let source = store.save_profile_config("a", &ConfigObject::new())?;
    let backup = store.create_backup(&source)?.expect("backup path");

    assert!(!ten_days_old.exists());
    assert_eq!(fs::read(&backup)?, fs::read(&source)?);
    assert!(backup.starts_with(&backups));
    Ok(())
}
