//! Subcommand handlers
//!
//! Handlers write their primary output to the supplied writer and return the
//! process exit code. Construction failures of individual commands are not
//! errors; they lead to [`EXIT_GROUP_FAILED`].

pub mod check;
pub mod docs;
pub mod generate;

use crate::cli::{Cli, Commands, SettingsArgs};
use anyhow::Context;
use std::io::Write;
use variantgen::GenerationConfig;
use variantgen_config::ConfigProvider;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
/// At least one command failed construction
pub const EXIT_GROUP_FAILED: i32 = 2;

/// Load configuration from files and environment, then apply command line settings
pub fn load_settings(settings: &SettingsArgs) -> anyhow::Result<GenerationConfig> {
    ConfigProvider::new()
        .with_overrides(settings.to_overrides())
        .load()
        .context("Failed to load configuration")
}

/// Run the parsed command line
pub fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<i32> {
    let config = load_settings(&cli.settings)?;
    match &cli.command {
        Commands::Generate {
            model,
            format,
            output,
        } => generate::run_generate(model, *format, output.as_deref(), config, out),
        Commands::Check { model } => check::run_check(model, config, out),
        Commands::Docs { model, command } => docs::run_docs(model, command, config, out),
    }
}
