use crate::context::Context;
use crate::schema::{refresh_schema_blocking, SchemaOrigin, SCHEMA_FILE};
use anyhow::Result;

/// Handle the `schema refresh` command.
pub(crate) fn handle_schema_refresh_command(ctx: &Context) -> Result<()> {
    ctx.global.ensure_directories()?;
    let origin = refresh_schema_blocking(&ctx.global, &ctx.schema_fetch)?;
    let path = ctx.global.cache_schema_dir().join(SCHEMA_FILE);
    match origin {
        SchemaOrigin::Downloaded => println!("Schema downloaded to {}", path.display()),
        SchemaOrigin::Cached => println!("Download failed; keeping cached schema at {}", path.display()),
        SchemaOrigin::Bundled => println!("Download failed; using bundled schema at {}", path.display()),
    }
    Ok(())
}
