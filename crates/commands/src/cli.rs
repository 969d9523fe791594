use clap::{Parser, Subcommand, ValueEnum};
use omo_switch_store::{ConfigType, Scope};
use std::path::PathBuf;

/// Scope selector accepted by `--scope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// The user-wide store under the config home.
    #[value(alias = "global")]
    User,
    /// The nearest `.opencode/` project.
    Project,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::User => Scope::User,
            ScopeArg::Project => Scope::Project,
        }
    }
}

/// Config dialect accepted by `omo-switch type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    /// oh-my-opencode: one file per profile.
    Omo,
    /// oh-my-opencode-slim: presets in a single file.
    #[value(alias = "omos")]
    Slim,
}

impl From<TypeArg> for ConfigType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Omo => ConfigType::Omo,
            TypeArg::Slim => ConfigType::Slim,
        }
    }
}

/// Command-line interface for `omo-switch`.
#[derive(Debug, Parser)]
#[command(
    name = "omo-switch",
    version,
    about = "Manage oh-my-opencode profiles across user and project scopes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Creates the store, caches the schema and applies a default profile.
    Init,
    /// Lists profiles (or presets) with the active one marked.
    #[command(alias = "ls")]
    List {
        /// Only this scope (default: project if found, then user).
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },
    /// Prints a profile's config file.
    Show {
        /// Profile id, or preset name in the slim dialect.
        id: String,
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },
    /// Imports a JSON/JSONC file as a profile (or preset).
    Add {
        /// File to import.
        file: PathBuf,
        /// Profile id (default: the file stem).
        #[arg(long)]
        id: Option<String>,
        /// Display name (default: derived from the id).
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum, default_value = "user")]
        scope: ScopeArg,
        /// Applies the profile right after importing it.
        #[arg(long, default_value_t = false)]
        activate: bool,
    },
    /// Writes a profile into the tool's config file and marks it active.
    Apply {
        id: String,
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },
    /// Removes a profile (or preset).
    #[command(alias = "remove")]
    Rm {
        id: String,
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
        /// Skips the confirmation prompt.
        #[arg(long, short = 'f', default_value_t = false)]
        force: bool,
    },
    /// Shows or switches the config dialect.
    Type {
        /// New dialect; prints the effective one when omitted.
        #[arg(value_enum)]
        config_type: Option<TypeArg>,
        /// `project` writes a per-project override instead of the global setting.
        #[arg(long, value_enum, default_value = "user")]
        scope: ScopeArg,
    },
    /// Schema cache maintenance.
    Schema {
        #[command(subcommand)]
        command: SchemaCommand,
    },
    /// Shows or updates global settings.
    Settings {
        /// Days after which backups are pruned.
        #[arg(long, value_name = "DAYS")]
        retention_days: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// Downloads the latest schema into the cache.
    Refresh,
}
