//! Command-line interface for the `omo-switch` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its functionality to the `omo-switch-commands` crate.

fn main() -> anyhow::Result<()> {
    omo_switch_commands::run()
}
