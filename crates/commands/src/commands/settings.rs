use crate::context::Context;
use anyhow::Result;

/// Handle the `settings` command.
pub(crate) fn handle_settings_command(ctx: &Context, retention_days: Option<u32>) -> Result<()> {
    let settings = ctx.global.settings();
    if let Some(days) = retention_days {
        settings.set_backup_retention_days(days)?;
        println!("Backup retention set to {days} days.");
    }
    let current = settings.load_settings();
    println!("settings file:         {}", settings.settings_path().display());
    println!("active type:           {}", current.active_type);
    println!("backup retention days: {}", current.backup_retention_days);
    Ok(())
}
