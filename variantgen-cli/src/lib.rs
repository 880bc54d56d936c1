//! Library side of the `vgen` command line tool
//!
//! Exposed separately from the binary so the command handlers can be driven
//! from tests with an in-memory writer.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod model_file;

pub use cli::{Cli, Commands, OutputFormat, SettingsArgs};
pub use commands::{run, EXIT_ERROR, EXIT_GROUP_FAILED, EXIT_SUCCESS};
pub use model_file::{load_model, LoadedModel, ModelError, ModelFile};
