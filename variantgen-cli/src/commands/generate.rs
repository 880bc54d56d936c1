//! `vgen generate`

use crate::cli::OutputFormat;
use crate::model_file::load_model;
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use variantgen::{GenerationConfig, ProxyGenerator, ProxySurface, Renderer, TextRenderer};

use super::{EXIT_GROUP_FAILED, EXIT_SUCCESS};

pub fn run_generate(
    model: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    config: GenerationConfig,
    out: &mut dyn Write,
) -> anyhow::Result<i32> {
    let model = load_model(model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;
    let renderer = TextRenderer::new(&config);
    let report = ProxyGenerator::new(model.schema)
        .with_config(config)
        .generate(model.commands)?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    for failure in &report.failures {
        eprintln!("error: {}: {}", failure.command, failure.error);
    }

    let mut skipped = 0;
    match output {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            for surface in &report.surfaces {
                let Some(path) = output_path(dir, &surface.command, format) else {
                    eprintln!(
                        "error: {}: command name cannot be used as a file name",
                        surface.command
                    );
                    skipped += 1;
                    continue;
                };
                let content = format_surface(surface, format, &renderer)?;
                std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                debug!(path = %path.display(), "wrote proxy");
            }
            info!(
                generated = report.surfaces.len(),
                failed = report.failures.len(),
                "generation finished"
            );
        }
        None => match format {
            OutputFormat::Text => {
                let rendered: Vec<String> = report
                    .surfaces
                    .iter()
                    .map(|surface| surface.render(&renderer))
                    .collect();
                out.write_all(rendered.join("\n").as_bytes())?;
            }
            OutputFormat::Json | OutputFormat::Yaml => {
                out.write_all(serialize(&report, format)?.as_bytes())?;
            }
        },
    }

    Ok(if report.has_failures() || skipped > 0 {
        EXIT_GROUP_FAILED
    } else {
        EXIT_SUCCESS
    })
}

/// `<dir>/<command>.<ext>`, or `None` when the command name is not a plain file name
fn output_path(dir: &Path, command: &str, format: OutputFormat) -> Option<PathBuf> {
    if command.is_empty() || command.contains(['/', '\\']) {
        return None;
    }
    let file_name = format!("{command}.{}", format.extension());
    let mut components = Path::new(&file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(dir.join(file_name)),
        _ => None,
    }
}

fn format_surface(
    surface: &ProxySurface,
    format: OutputFormat,
    renderer: &dyn Renderer,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(surface.render(renderer)),
        OutputFormat::Json | OutputFormat::Yaml => serialize(surface, format),
    }
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(value)?,
        _ => {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            json
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for_plain_names() {
        let dir = Path::new("out");
        assert_eq!(
            output_path(dir, "Get-Thing", OutputFormat::Yaml),
            Some(PathBuf::from("out/Get-Thing.yaml"))
        );
        assert_eq!(
            output_path(dir, "Get.Thing", OutputFormat::Text),
            Some(PathBuf::from("out/Get.Thing.txt"))
        );
    }

    #[test]
    fn test_output_path_rejects_names_leaving_the_directory() {
        let dir = Path::new("out");
        for command in ["", "../Escape", "nested/Get-Thing", "/etc/Get-Thing", "..\\Escape"] {
            assert_eq!(output_path(dir, command, OutputFormat::Json), None, "{command}");
        }
    }
}
