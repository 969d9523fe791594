use super::{apply::handle_apply_command, scope_label};
use crate::context::Context;
use anyhow::{bail, Context as _, Result};
use omo_switch_store::{
    display_name_from_id, parse_jsonc_object, preset_manager, resolve_project_root,
    ConfigExtension, ConfigType, PresetConfig, Profile, ProfileFiles, ProjectStore, Scope,
};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Profile ids become file names, so they may not name other directories.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
        bail!("invalid profile id '{id}'");
    }
    Ok(())
}

fn id_from_file(file: &Path) -> Result<String> {
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("cannot derive a profile id from {}", file.display()))?;
    Ok(stem.to_string())
}

/// Handle the `add` command.
pub(crate) fn handle_add_command(
    ctx: &Context,
    file: &Path,
    id: Option<String>,
    name: Option<String>,
    scope: Scope,
    activate: bool,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let config = parse_jsonc_object(&content)
        .with_context(|| format!("{} is not a JSON object", file.display()))?;
    let id = match id {
        Some(id) => id,
        None => id_from_file(file)?,
    };
    validate_id(&id)?;
    let ext = ConfigExtension::of(file).unwrap_or(ConfigExtension::Json);

    let project_root = match scope {
        Scope::Project => Some(resolve_project_root(&ctx.cwd)?),
        Scope::User => ctx.project_root()?,
    };
    let config_type = ctx.effective_type(project_root.as_deref());

    match (config_type, scope) {
        (ConfigType::Omo, Scope::User) => {
            let store = &ctx.global;
            store.ensure_directories()?;
            let mut index = store.load_index()?;
            if index.contains(&id) || store.config_exists(&id) {
                bail!("Profile '{id}' already exists {}", scope_label(scope));
            }
            store.save_profile_config_raw(&id, &content, ext)?;
            let name = name.unwrap_or_else(|| display_name_from_id(&id));
            index.upsert_profile(Profile::new(id.clone(), name, config));
            store.save_index(&index)?;
        }
        (ConfigType::Omo, Scope::Project) => {
            let root = project_root.context("project root was not resolved")?;
            let store = ProjectStore::with_settings(root, ctx.global.settings().clone());
            if store.config_exists(&id) {
                bail!("Profile '{id}' already exists {}", scope_label(scope));
            }
            store.save_profile_config_raw(&id, &content, ext)?;
        }
        (ConfigType::Slim, scope) => {
            let preset: PresetConfig = serde_json::from_value(Value::Object(config))
                .with_context(|| format!("{} is not a valid preset", file.display()))?;
            let presets = preset_manager(&ctx.global, scope, project_root.as_deref())?;
            if presets.preset(&id).is_some() {
                bail!("Preset '{id}' already exists {}", scope_label(scope));
            }
            presets.add_preset(&id, preset)?;
        }
    }
    println!("Added profile '{id}' {}", scope_label(scope));

    if activate {
        handle_apply_command(ctx, &id, Some(scope))?;
    }
    Ok(())
}
