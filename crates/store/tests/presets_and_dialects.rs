//! Slim preset file behaviour and dialect selection.

use anyhow::Result;
use omo_switch_store::{
    open_backend, ConfigType, GlobalStore, PresetConfig, PresetConfigManager, ProfileBackend,
    ProfileFiles, ProjectRc, ProjectStore, Scope, SettingsManager, StoreError,
};
use omo_switch_test_utils::{env_guard, TestFixture};
use std::fs;

fn manager(fixture: &TestFixture, file: &str) -> PresetConfigManager {
    PresetConfigManager::with_paths(
        Scope::User,
        fixture.config_home.join("opencode").join(file),
        fixture.store_root.join("backups"),
        SettingsManager::in_store(&fixture.store_root),
    )
}

#[test]
fn given_no_file_when_loading_then_none_and_load_or_create_writes_default() -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.json");

    assert!(presets.load_config().is_none());
    assert!(presets.list_presets().is_empty());
    assert_eq!(presets.active_preset(), None);

    let config = presets.load_or_create_config()?;
    assert_eq!(config.preset.as_deref(), Some("zen-free"));
    assert!(presets.config_exists());
    assert_eq!(presets.list_presets(), vec!["zen-free"]);
    assert_eq!(presets.preset_agent_count("zen-free"), 6);
    Ok(())
}

#[test]
fn given_malformed_file_when_loading_then_none() -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.json");
    fixture.write(presets.target_path(), "{ broken")?;
    assert!(presets.load_config().is_none());
    assert_eq!(presets.preset_agent_count("zen-free"), 0);
    Ok(())
}

#[test]
fn given_unparsable_existing_file_when_mutating_then_error_and_file_is_untouched() -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.json");
    let original = r#"{"preset": "mine", "presets": {"mine": {"oracle": 42}}}"#;
    fixture.write(presets.target_path(), original)?;

    let err = presets
        .add_preset("new", PresetConfig::uniform("m"))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidConfig { .. }));
    assert!(presets.set_active_preset(Some("new")).is_err());
    assert!(presets.remove_preset("mine").is_err());
    assert!(presets.load_or_create_config().is_err());

    assert_eq!(fs::read_to_string(presets.target_path())?, original);
    Ok(())
}

#[test]
fn given_user_presets_with_unlisted_variant_when_adding_then_existing_presets_survive(
) -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.json");
    fixture.write(
        presets.target_path(),
        r#"{
  "preset": "mine",
  "presets": {
    "mine": {"oracle": {"model": "x", "variant": "xhigh"}},
    "other": {"fixer": {"model": "y"}}
  },
  "tmux": {"enabled": true, "layout": "main-vertical-custom"}
}"#,
    )?;

    presets.add_preset("new", PresetConfig::uniform("m"))?;

    assert_eq!(presets.list_presets(), vec!["mine", "other", "new"]);
    assert_eq!(presets.active_preset().as_deref(), Some("mine"));
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(presets.target_path())?)?;
    assert_eq!(value["presets"]["mine"]["oracle"]["variant"], "xhigh");
    assert_eq!(value["tmux"]["layout"], "main-vertical-custom");
    assert!(value["presets"].get("zen-free").is_none());
    Ok(())
}

#[test]
fn given_unmodelled_fields_when_switching_active_preset_then_they_are_preserved() -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.json");
    let presets_before = serde_json::json!({
        "a": {"oracle": {"model": "x", "prompt": "keep me"}, "reviewer": {"model": "r"}},
        "b": {"fixer": {"model": "y", "temperature": 0.3}}
    });
    fixture.write(
        presets.target_path(),
        &serde_json::json!({"preset": "a", "presets": presets_before.clone()}).to_string(),
    )?;

    presets.set_active_preset(Some("b"))?;

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(presets.target_path())?)?;
    assert_eq!(value["preset"], "b");
    assert_eq!(value["presets"], presets_before);
    Ok(())
}

#[test]
fn given_presets_when_adding_and_removing_then_file_follows() -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.json");

    presets.add_preset("fast", PresetConfig::uniform("provider/fast"))?;
    assert_eq!(presets.list_presets(), vec!["zen-free", "fast"]);
    assert_eq!(
        presets.preset("fast").and_then(|p| p.oracle).and_then(|a| a.model),
        Some("provider/fast".to_string())
    );

    assert!(presets.remove_preset("fast")?);
    assert!(!presets.remove_preset("fast")?);
    assert_eq!(presets.list_presets(), vec!["zen-free"]);
    Ok(())
}

#[test]
fn given_undefined_name_when_setting_active_preset_then_it_is_accepted() -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.json");

    presets.set_active_preset(Some("not-defined-yet"))?;
    assert_eq!(presets.active_preset().as_deref(), Some("not-defined-yet"));
    assert!(presets.preset("not-defined-yet").is_none());

    presets.set_active_preset(None)?;
    assert_eq!(presets.active_preset(), None);
    Ok(())
}

#[test]
fn given_jsonc_target_when_saving_then_plain_json_is_written() -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.jsonc");
    fixture.write(
        presets.target_path(),
        "// mine\n{\"preset\": \"a\", \"presets\": {\"a\": {}}, \"custom_key\": [1]}",
    )?;

    presets.set_active_preset(Some("a"))?;
    let text = fs::read_to_string(presets.target_path())?;
    assert!(!text.contains("//"));
    let value: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(value["custom_key"], serde_json::json!([1]));
    Ok(())
}

#[test]
fn given_config_when_backing_up_then_fixed_basename_is_used() -> Result<()> {
    let fixture = TestFixture::new()?;
    let presets = manager(&fixture, "oh-my-opencode-slim.jsonc");
    assert!(presets.create_backup()?.is_none());

    presets.load_or_create_config()?;
    let backup = presets.create_backup()?.expect("backup");
    let name = backup.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("__oh-my-opencode-slim.json"), "{name}");
    Ok(())
}

#[test]
fn given_project_store_backend_when_moving_pointer_then_type_override_survives() -> Result<()> {
    let fixture = TestFixture::new()?;
    let store = ProjectStore::with_settings(
        fixture.project_root.clone(),
        SettingsManager::in_store(&fixture.store_root),
    );
    store.save_profile_config("team", &Default::default())?;
    store.save_rc(&ProjectRc {
        active_profile_id: None,
        config_type: Some(ConfigType::Omo),
    })?;

    assert!(!store.set_active(Some("ghost"))?);
    assert!(store.set_active(Some("team"))?);
    assert_eq!(store.active()?.as_deref(), Some("team"));
    assert_eq!(
        store.load_rc().and_then(|rc| rc.config_type),
        Some(ConfigType::Omo)
    );
    assert!(store.config_exists("team"));
    Ok(())
}

#[test]
fn given_effective_type_when_opening_backend_then_matching_dialect_is_chosen() -> Result<()> {
    let _g = env_guard();
    let fixture = TestFixture::new()?;
    let _xdg = fixture.config_home_guard();
    let global = GlobalStore::with_root(fixture.store_root.clone());

    let backend = open_backend(&global, Scope::User, None)?;
    assert_eq!(backend.config_type(), ConfigType::Omo);
    assert_eq!(backend.scope(), Scope::User);
    assert!(backend.list()?.is_empty());

    fs::write(
        fixture.project_root.join(".opencode/.omorc"),
        r#"{"activeProfileId":null,"type":"slim"}"#,
    )?;
    let backend = open_backend(&global, Scope::Project, Some(&fixture.project_root))?;
    assert_eq!(backend.config_type(), ConfigType::Slim);
    assert!(backend.set_active(Some("zen-free"))?);
    assert_eq!(backend.active()?.as_deref(), Some("zen-free"));
    assert!(fixture
        .project_root
        .join(".opencode/oh-my-opencode-slim.json")
        .exists());

    global.settings().set_active_type(ConfigType::Slim)?;
    let backend = open_backend(&global, Scope::User, None)?;
    assert_eq!(backend.config_type(), ConfigType::Slim);
    assert_eq!(backend.list()?, Vec::<String>::new());

    assert!(open_backend(&global, Scope::Project, None).is_err());
    Ok(())
}
