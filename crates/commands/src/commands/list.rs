use super::{scope_label, search_order};
use crate::context::Context;
use anyhow::Result;
use omo_switch_store::{
    preset_manager, ConfigType, ProfileBackend, ProfileFiles, ProjectStore, Scope,
};
use std::path::Path;

fn marker(active: bool) -> &'static str {
    if active {
        "*"
    } else {
        " "
    }
}

fn list_user_profiles(ctx: &Context) -> Result<()> {
    let report = ctx.global.sync_profiles()?;
    for id in &report.added {
        tracing::info!(id = %id, "indexed profile file");
    }
    let index = ctx.global.load_index()?;
    if index.profiles.is_empty() {
        println!("  (no profiles)");
        return Ok(());
    }
    for profile in &index.profiles {
        let active = index.active_profile_id.as_deref() == Some(profile.id.as_str());
        println!("{} {}  ({})", marker(active), profile.id, profile.name);
    }
    Ok(())
}

fn list_project_profiles(ctx: &Context, root: &Path) -> Result<()> {
    let store = ProjectStore::with_settings(root.to_path_buf(), ctx.global.settings().clone());
    let active = store.active()?;
    let ids = store.list()?;
    if ids.is_empty() {
        println!("  (no profiles)");
    }
    for id in ids {
        println!("{} {id}", marker(active.as_deref() == Some(id.as_str())));
    }
    if let Some(dangling) = active.filter(|id| !store.config_exists(id)) {
        println!("  (active profile '{dangling}' has no config file)");
    }
    Ok(())
}

fn list_presets(ctx: &Context, scope: Scope, root: Option<&Path>) -> Result<()> {
    let presets = preset_manager(&ctx.global, scope, root)?;
    let names = presets.list_presets();
    if names.is_empty() {
        println!("  (no presets)");
        return Ok(());
    }
    let active = presets.active_preset();
    for name in names {
        let count = presets.preset_agent_count(&name);
        println!(
            "{} {name}  ({count} agents)",
            marker(active.as_deref() == Some(name.as_str()))
        );
    }
    Ok(())
}

/// Handle the `list` command.
pub(crate) fn handle_list_command(ctx: &Context, scope: Option<Scope>) -> Result<()> {
    let project_root = ctx.project_root()?;
    let root = project_root.as_deref();
    if scope == Some(Scope::Project) && root.is_none() {
        ctx.require_project_root()?;
    }
    let config_type = ctx.effective_type(root);

    for scope in search_order(scope, root) {
        println!("{} {config_type}", scope_label(scope));
        match (config_type, scope) {
            (ConfigType::Omo, Scope::User) => list_user_profiles(ctx)?,
            (ConfigType::Omo, Scope::Project) => {
                if let Some(root) = root {
                    list_project_profiles(ctx, root)?;
                }
            }
            (ConfigType::Slim, scope) => list_presets(ctx, scope, root)?,
        }
    }
    Ok(())
}
