//! Command layer for the `omo-switch` binary.
//!
//! [`run`] installs logging, parses the command line and hands the command to
//! [`dispatch`]. Handlers are thin: every store invariant lives in
//! `omo-switch-store`, and this crate only decides which scope and dialect a
//! command acts on and what to print.
//!
//! Log output goes to stderr and is controlled by `RUST_LOG`; stdout carries
//! command output only.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
mod commands;
pub mod context;
pub mod schema;

pub use cli::{Cli, Commands, SchemaCommand, ScopeArg, TypeArg};
pub use context::Context;

use commands::{
    handle_add_command, handle_apply_command, handle_init_command, handle_list_command,
    handle_rm_command, handle_schema_refresh_command, handle_settings_command,
    handle_show_command, handle_type_command,
};

/// The main entry point for the `omo-switch` application.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Context::from_env()?;
    dispatch(cli.command, &ctx)
}

/// Runs one command against `ctx`.
pub fn dispatch(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Init => handle_init_command(ctx),
        Commands::List { scope } => handle_list_command(ctx, scope.map(Into::into)),
        Commands::Show { id, scope } => handle_show_command(ctx, &id, scope.map(Into::into)),
        Commands::Add {
            file,
            id,
            name,
            scope,
            activate,
        } => handle_add_command(ctx, &file, id, name, scope.into(), activate),
        Commands::Apply { id, scope } => handle_apply_command(ctx, &id, scope.map(Into::into)),
        Commands::Rm { id, scope, force } => {
            handle_rm_command(ctx, &id, scope.map(Into::into), force)
        }
        Commands::Type { config_type, scope } => {
            handle_type_command(ctx, config_type.map(Into::into), scope.into())
        }
        Commands::Schema {
            command: SchemaCommand::Refresh,
        } => handle_schema_refresh_command(ctx),
        Commands::Settings { retention_days } => handle_settings_command(ctx, retention_days),
    }
}
