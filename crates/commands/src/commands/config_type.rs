use crate::context::Context;
use anyhow::Result;
use omo_switch_store::{load_project_rc, resolve_project_root, save_project_rc, ConfigType, Scope};

/// Handle the `type` command.
pub(crate) fn handle_type_command(
    ctx: &Context,
    config_type: Option<ConfigType>,
    scope: Scope,
) -> Result<()> {
    let settings = ctx.global.settings();

    let Some(config_type) = config_type else {
        let project_root = ctx.project_root()?;
        let root = project_root.as_deref();
        let effective = ctx.effective_type(root);
        if settings.is_project_override(root) {
            println!("{effective} (project override)");
        } else {
            println!("{effective}");
        }
        return Ok(());
    };

    match scope {
        Scope::User => {
            settings.set_active_type(config_type)?;
            println!("Global config type set to {config_type}");
            let project_root = ctx.project_root()?;
            if settings.is_project_override(project_root.as_deref()) {
                let effective = ctx.effective_type(project_root.as_deref());
                println!("Note: this project overrides it with {effective}");
            }
        }
        Scope::Project => {
            let root = resolve_project_root(&ctx.cwd)?;
            let mut rc = load_project_rc(&root).unwrap_or_default();
            rc.config_type = Some(config_type);
            save_project_rc(&root, &rc)?;
            println!("Project config type set to {config_type} ({})", root.display());
        }
    }
    Ok(())
}
