//! `vgen check`

use crate::model_file::load_model;
use anyhow::Context;
use std::io::Write;
use std::path::Path;
use variantgen::{GenerationConfig, ProxyGenerator};

use super::{EXIT_GROUP_FAILED, EXIT_SUCCESS};

/// Build every command's variant group and report the outcome per command
pub fn run_check(model: &Path, config: GenerationConfig, out: &mut dyn Write) -> anyhow::Result<i32> {
    let model = load_model(model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;
    config.validate()?;
    let generator = ProxyGenerator::new(model.schema).with_config(config);

    let total = model.commands.len();
    let mut failed = 0;
    let mut warnings = 0;
    for source in model.commands {
        let name = source.name.clone();
        match generator.build_group(source) {
            Ok(group) => {
                let default = group.default_parameter_set().name().unwrap_or("none");
                writeln!(
                    out,
                    "ok      {} ({} variants, default: {})",
                    name,
                    group.variants().len(),
                    default
                )?;
                if let Some(warning) = group.default_warning() {
                    warnings += 1;
                    writeln!(out, "warning {warning}")?;
                }
            }
            Err(error) => {
                failed += 1;
                writeln!(out, "error   {name}: {error}")?;
            }
        }
    }

    writeln!(
        out,
        "{total} commands checked, {failed} failed, {warnings} warnings"
    )?;
    Ok(if failed > 0 {
        EXIT_GROUP_FAILED
    } else {
        EXIT_SUCCESS
    })
}
