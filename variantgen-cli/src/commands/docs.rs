//! `vgen docs`

use crate::model_file::load_model;
use anyhow::{anyhow, Context};
use std::io::Write;
use std::path::Path;
use variantgen::{
    Documentation, GenerationConfig, ParameterHelp, ProxyGenerator, ProxySurface, Renderer,
    TextRenderer,
};

use super::{EXIT_GROUP_FAILED, EXIT_SUCCESS};

pub fn run_docs(
    model: &Path,
    command: &str,
    config: GenerationConfig,
    out: &mut dyn Write,
) -> anyhow::Result<i32> {
    let model = load_model(model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;
    config.validate()?;
    let source = model
        .command(command)
        .cloned()
        .ok_or_else(|| anyhow!("Command '{command}' is not defined in the model"))?;

    let generator = ProxyGenerator::new(model.schema).with_config(config.clone());
    let group = match generator.build_group(source) {
        Ok(group) => group,
        Err(error) => {
            eprintln!("error: {command}: {error}");
            return Ok(EXIT_GROUP_FAILED);
        }
    };
    if let Some(warning) = group.default_warning() {
        eprintln!("warning: {warning}");
    }

    let surface = ProxySurface::build(&group, &config);
    out.write_all(render_documentation(&surface.documentation, &config).as_bytes())?;
    Ok(EXIT_SUCCESS)
}

/// Syntax, help block and parameter details as plain text
pub fn render_documentation(docs: &Documentation, config: &GenerationConfig) -> String {
    let indent = config.indent();
    let renderer = TextRenderer::new(config);
    let mut text = String::new();

    text.push_str("SYNTAX\n");
    for line in &docs.syntax {
        text.push_str(&format!("{indent}{line}\n"));
    }

    text.push_str("\nHELP\n");
    text.push_str(&renderer.render(&docs.help_directives(config.half_indent)));

    if !docs.parameters.is_empty() {
        text.push_str("\nPARAMETERS\n");
        for parameter in &docs.parameters {
            text.push_str(&parameter_section(parameter, &indent));
        }
    }
    text
}

fn parameter_section(parameter: &ParameterHelp, indent: &str) -> String {
    let mut lines = vec![format!("-{} <{}>", parameter.name, parameter.type_name)];
    if !parameter.description.is_empty() {
        lines.push(format!("{indent}{}", parameter.description));
    }
    lines.push(format!("{indent}Required?                    {}", parameter.required));
    lines.push(format!("{indent}Position?                    {}", parameter.position));
    lines.push(format!("{indent}Accept pipeline input?       {}", parameter.pipeline_input));
    lines.push(format!(
        "{indent}Parameter set name           {}",
        parameter.parameter_sets.join(", ")
    ));
    if !parameter.aliases.is_empty() {
        lines.push(format!("{indent}Aliases                      {}", parameter.aliases.join(", ")));
    }
    if let Some(default) = &parameter.default_value {
        lines.push(format!("{indent}Default value                {default}"));
    }
    lines.push(format!("{indent}Accept wildcard characters?  {}", parameter.globbing));
    lines.push(format!("{indent}Dynamic?                     {}", parameter.dynamic));

    let mut section = lines.join("\n");
    section.push_str("\n\n");
    section
}
