use crate::context::Context;
use crate::schema::refresh_schema_blocking;
use anyhow::{Context as _, Result};
use omo_switch_store::fs_util::write_atomic;
use omo_switch_store::{
    find_existing_global_target, global_target_path, parse_jsonc_object, render_applied_config,
    Profile,
};

pub(crate) const DEFAULT_PROFILE_ID: &str = "default";
pub(crate) const DEFAULT_TEMPLATE: &str = include_str!("../../assets/default-template.json");

/// Handle the `init` command.
pub(crate) fn handle_init_command(ctx: &Context) -> Result<()> {
    let store = &ctx.global;
    store
        .ensure_directories()
        .context("failed to create store directories")?;

    let origin = refresh_schema_blocking(store, &ctx.schema_fetch)?;
    println!("Schema ready ({origin})");

    let mut index = store.load_index()?;
    if let Some(existing) = find_existing_global_target()? {
        println!("Using existing config: {}", existing.display());
        if index.profiles.is_empty() {
            println!("Existing config detected, no default profile created.");
            println!("Use 'omo-switch add <file>' to import it as a profile.");
        }
    } else if index.profiles.is_empty() {
        let config =
            parse_jsonc_object(DEFAULT_TEMPLATE).context("bundled default template is invalid")?;
        store.save_profile_config(DEFAULT_PROFILE_ID, &config)?;
        index.upsert_profile(Profile::new(
            DEFAULT_PROFILE_ID,
            DEFAULT_PROFILE_ID,
            config.clone(),
        ));
        index.set_active(Some(DEFAULT_PROFILE_ID));
        store.save_index(&index)?;

        let target = global_target_path()?;
        let rendered = render_applied_config(DEFAULT_PROFILE_ID, &config)?;
        write_atomic(&target, rendered.as_bytes())?;
        println!("Default profile applied to {}", target.display());
    }

    println!("omo-switch initialized at {}", store.store_root().display());
    Ok(())
}
