//! CLI command handlers for omo-switch.

mod add;
mod apply;
mod config_type;
mod init;
mod list;
mod rm;
mod schema;
mod settings;
mod show;

pub(crate) use add::handle_add_command;
pub(crate) use apply::handle_apply_command;
pub(crate) use config_type::handle_type_command;
pub(crate) use init::handle_init_command;
pub(crate) use list::handle_list_command;
pub(crate) use rm::handle_rm_command;
pub(crate) use schema::handle_schema_refresh_command;
pub(crate) use settings::handle_settings_command;
pub(crate) use show::handle_show_command;

use omo_switch_store::Scope;
use std::path::Path;

/// Scopes to search, in order, when `--scope` was not given.
pub(crate) fn search_order(scope: Option<Scope>, project_root: Option<&Path>) -> Vec<Scope> {
    match (scope, project_root) {
        (Some(scope), _) => vec![scope],
        (None, Some(_)) => vec![Scope::Project, Scope::User],
        (None, None) => vec![Scope::User],
    }
}

pub(crate) fn scope_label(scope: Scope) -> String {
    format!("[{scope}]")
}
