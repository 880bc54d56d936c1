//! Command line definition for `vgen`

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use variantgen_config::ConfigOverrides;

/// How generated proxies are written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Rendered proxy source
    #[default]
    Text,
    /// Serialized surfaces as JSON
    Json,
    /// Serialized surfaces as YAML
    Yaml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// vgen - merge command variants into proxy commands
///
/// Reads a model file of types and command variants, and generates one proxy
/// per command that forwards to the variant selected by parameter set.
#[derive(Parser, Debug)]
#[command(name = "vgen")]
#[command(version)]
#[command(about = "Merge command variants into proxy commands")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that override configuration files and environment variables
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Spaces per half indent
    #[arg(long, global = true)]
    pub half_indent: Option<usize>,

    /// Impact level declared by commands that support confirmation
    #[arg(long, global = true)]
    pub confirm_impact: Option<String>,

    /// Allow unnamed arguments to bind by position
    #[arg(long, global = true)]
    pub positional_binding: bool,

    /// Leave complex parameter notes out of help
    #[arg(long, global = true)]
    pub no_complex_notes: bool,

    /// Generate commands one after another
    #[arg(long, global = true)]
    pub sequential: bool,
}

impl SettingsArgs {
    /// Only flags that were given become overrides
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            half_indent: self.half_indent,
            confirm_impact: self.confirm_impact.clone(),
            positional_binding: self.positional_binding.then_some(true),
            include_complex_notes: self.no_complex_notes.then_some(false),
            parallel: self.sequential.then_some(false),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate proxies for every command in a model file
    Generate {
        /// Model file (YAML or JSON)
        model: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write one file per command into this directory instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Report construction errors and default warnings without generating
    Check {
        /// Model file (YAML or JSON)
        model: PathBuf,
    },
    /// Print the documentation of one command
    Docs {
        /// Model file (YAML or JSON)
        model: PathBuf,
        /// Command name
        command: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "vgen",
            "generate",
            "model.yaml",
            "--format",
            "json",
            "--output",
            "out",
            "--half-indent",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                model,
                format,
                output,
            } => {
                assert_eq!(model, PathBuf::from("model.yaml"));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.settings.half_indent, Some(4));
    }

    #[test]
    fn test_unset_flags_do_not_override() {
        let overrides = SettingsArgs::default().to_overrides();
        assert!(overrides.half_indent.is_none());
        assert!(overrides.positional_binding.is_none());
        assert!(overrides.include_complex_notes.is_none());
        assert!(overrides.parallel.is_none());

        let overrides = SettingsArgs {
            sequential: true,
            no_complex_notes: true,
            ..Default::default()
        }
        .to_overrides();
        assert_eq!(overrides.parallel, Some(false));
        assert_eq!(overrides.include_complex_notes, Some(false));
    }
}
