use super::scope_label;
use crate::context::Context;
use anyhow::{bail, Result};
use omo_switch_store::fs_util::write_atomic;
use omo_switch_store::{
    find_existing_global_target, global_target_path, preset_manager, render_applied_config,
    ConfigType, ProfileBackend, ProfileFiles, ProjectStore, Scope,
};
use std::path::Path;

fn apply_user_profile(ctx: &Context, id: &str) -> Result<()> {
    let store = &ctx.global;
    store.ensure_directories()?;
    store.sync_profiles()?;
    let mut index = store.load_index()?;
    let Some(profile) = index.find(id) else {
        bail!("Profile '{id}' not found {}", scope_label(Scope::User));
    };
    let name = profile.name.clone();
    // The standalone file wins over the index snapshot.
    let config = match store.profile_config(id)? {
        Some(config) => config,
        None => profile.config.clone(),
    };

    if let Some(existing) = find_existing_global_target()? {
        if let Some(backup) = store.create_backup(&existing)? {
            println!("Backed up {} to {}", existing.display(), backup.display());
        }
    }
    let target = global_target_path()?;
    write_atomic(&target, render_applied_config(&name, &config)?.as_bytes())?;

    index.set_active(Some(id));
    store.save_index(&index)?;
    println!("Applied '{id}' to {}", target.display());
    Ok(())
}

fn apply_project_profile(ctx: &Context, root: &Path, id: &str) -> Result<()> {
    let store = ProjectStore::with_settings(root.to_path_buf(), ctx.global.settings().clone());
    let Some(config) = store.profile_config(id)? else {
        bail!("Profile '{id}' not found {}", scope_label(Scope::Project));
    };
    store.ensure_directories()?;

    let target = store.target_path();
    if let Some(backup) = store.create_backup(&target)? {
        println!("Backed up {} to {}", target.display(), backup.display());
    }
    write_atomic(&target, render_applied_config(id, &config)?.as_bytes())?;
    store.set_active(Some(id))?;
    println!("Applied '{id}' to {}", target.display());
    Ok(())
}

fn apply_preset(ctx: &Context, scope: Scope, root: Option<&Path>, id: &str) -> Result<()> {
    let presets = preset_manager(&ctx.global, scope, root)?;
    if presets.preset(id).is_none() {
        bail!("Preset '{id}' not found {}", scope_label(scope));
    }
    if let Some(backup) = presets.create_backup()? {
        println!("Backed up {} to {}", presets.target_path().display(), backup.display());
    }
    presets.set_active_preset(Some(id))?;
    println!("Active preset set to '{id}' {}", scope_label(scope));
    Ok(())
}

/// Handle the `apply` command.
pub(crate) fn handle_apply_command(ctx: &Context, id: &str, scope: Option<Scope>) -> Result<()> {
    let project_root = match scope {
        Some(Scope::Project) => Some(ctx.require_project_root()?),
        _ => ctx.project_root()?,
    };
    let root = project_root.as_deref();

    match ctx.effective_type(root) {
        ConfigType::Omo => {
            let use_project = match (scope, root) {
                (Some(Scope::Project), Some(_)) => true,
                (None, Some(root)) => {
                    ProjectStore::with_settings(root.to_path_buf(), ctx.global.settings().clone())
                        .config_exists(id)
                }
                _ => false,
            };
            match root.filter(|_| use_project) {
                Some(root) => apply_project_profile(ctx, root, id),
                None => apply_user_profile(ctx, id),
            }
        }
        ConfigType::Slim => {
            let scope = scope.unwrap_or(if root.is_some() {
                Scope::Project
            } else {
                Scope::User
            });
            apply_preset(ctx, scope, root, id)
        }
    }
}
