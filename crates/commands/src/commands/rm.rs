use super::{scope_label, search_order};
use crate::context::Context;
use anyhow::{bail, Result};
use omo_switch_store::{preset_manager, ConfigType, ProfileFiles, ProjectStore, Scope};
use std::path::Path;

/// Outcome of trying one scope.
enum Removal {
    NotFound,
    Cancelled,
    Removed,
}

fn confirmed(ctx: &Context, force: bool, id: &str, scope: Scope) -> Result<bool> {
    if force {
        return Ok(true);
    }
    ctx.confirm(&format!("Delete profile '{id}' {}?", scope_label(scope)))
}

fn remove_user_profile(ctx: &Context, id: &str, force: bool) -> Result<Removal> {
    if !ctx.global.load_index()?.contains(id) {
        return Ok(Removal::NotFound);
    }
    if !confirmed(ctx, force, id, Scope::User)? {
        return Ok(Removal::Cancelled);
    }
    ctx.global.delete_profile(id)?;
    Ok(Removal::Removed)
}

fn remove_project_profile(ctx: &Context, root: &Path, id: &str, force: bool) -> Result<Removal> {
    let store = ProjectStore::with_settings(root.to_path_buf(), ctx.global.settings().clone());
    if !store.config_exists(id) {
        return Ok(Removal::NotFound);
    }
    if !confirmed(ctx, force, id, Scope::Project)? {
        return Ok(Removal::Cancelled);
    }
    store.delete_profile_config(id)?;

    // Clear the pointer only if it named this profile; any type override stays.
    if let Some(mut rc) = store.load_rc() {
        if rc.active_profile_id.as_deref() == Some(id) {
            rc.active_profile_id = None;
            store.save_rc(&rc)?;
        }
    }
    Ok(Removal::Removed)
}

fn remove_preset(
    ctx: &Context,
    scope: Scope,
    root: Option<&Path>,
    id: &str,
    force: bool,
) -> Result<Removal> {
    let presets = preset_manager(&ctx.global, scope, root)?;
    if presets.preset(id).is_none() {
        return Ok(Removal::NotFound);
    }
    if !confirmed(ctx, force, id, scope)? {
        return Ok(Removal::Cancelled);
    }
    presets.remove_preset(id)?;
    Ok(Removal::Removed)
}

/// Handle the `rm` command.
pub(crate) fn handle_rm_command(
    ctx: &Context,
    id: &str,
    scope: Option<Scope>,
    force: bool,
) -> Result<()> {
    let project_root = match scope {
        Some(Scope::Project) => Some(ctx.require_project_root()?),
        _ => ctx.project_root()?,
    };
    let root = project_root.as_deref();
    let config_type = ctx.effective_type(root);

    for scope in search_order(scope, root) {
        let outcome = match (config_type, scope, root) {
            (ConfigType::Omo, Scope::User, _) => remove_user_profile(ctx, id, force)?,
            (ConfigType::Omo, Scope::Project, Some(root)) => {
                remove_project_profile(ctx, root, id, force)?
            }
            (ConfigType::Omo, Scope::Project, None) => Removal::NotFound,
            (ConfigType::Slim, scope, root) => remove_preset(ctx, scope, root, id, force)?,
        };
        match outcome {
            Removal::NotFound => continue,
            Removal::Cancelled => {
                println!("Operation cancelled.");
                return Ok(());
            }
            Removal::Removed => {
                println!("Deleted profile '{id}' {}", scope_label(scope));
                return Ok(());
            }
        }
    }
    bail!("Profile '{id}' not found.")
}
