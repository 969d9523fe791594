use super::{scope_label, search_order};
use crate::context::Context;
use anyhow::{bail, Result};
use omo_switch_store::{preset_manager, ConfigType, ProfileFiles, ProjectStore, RawConfig, Scope};
use std::path::Path;

fn raw_config(ctx: &Context, scope: Scope, root: Option<&Path>, id: &str) -> Result<Option<RawConfig>> {
    match (scope, root) {
        (Scope::User, _) => Ok(ctx.global.profile_config_raw(id)?),
        (Scope::Project, Some(root)) => {
            let store =
                ProjectStore::with_settings(root.to_path_buf(), ctx.global.settings().clone());
            Ok(store.profile_config_raw(id)?)
        }
        (Scope::Project, None) => Ok(None),
    }
}

/// Handle the `show` command.
pub(crate) fn handle_show_command(ctx: &Context, id: &str, scope: Option<Scope>) -> Result<()> {
    let project_root = ctx.project_root()?;
    let root = project_root.as_deref();
    if scope == Some(Scope::Project) && root.is_none() {
        ctx.require_project_root()?;
    }

    match ctx.effective_type(root) {
        ConfigType::Omo => {
            for scope in search_order(scope, root) {
                if let Some(raw) = raw_config(ctx, scope, root, id)? {
                    tracing::debug!(path = %raw.path.display(), "showing profile");
                    println!("{}", raw.content.trim_end());
                    return Ok(());
                }
            }
            bail!("Profile '{id}' not found.")
        }
        ConfigType::Slim => {
            for scope in search_order(scope, root) {
                let presets = preset_manager(&ctx.global, scope, root)?;
                if let Some(preset) = presets.preset(id) {
                    println!("{} {id}", scope_label(scope));
                    println!("{}", serde_json::to_string_pretty(&preset)?);
                    return Ok(());
                }
            }
            bail!("Preset '{id}' not found.")
        }
    }
}
