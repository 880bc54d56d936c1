//! Render-ready proxy command
//!
//! A [`ProxySurface`] bundles everything a renderer needs for one command:
//! command attributes, parameter declarations, documentation, the dispatch
//! table and the forwarding plan.

use crate::attributes::{self, AttributeSpec, ParameterBinding};
use crate::config::GenerationConfig;
use crate::docs::Documentation;
use crate::emit::{Directive, Renderer};
use crate::forwarder::ForwardingPlan;
use crate::group::{ParameterGroup, VariantGroup};
use crate::resolver::DispatchTable;
use crate::schema::Schema;
use serde::Serialize;

/// One parameter of the proxy command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDeclaration {
    pub name: String,
    pub type_name: String,
    /// Help text, one entry per non-empty line
    pub help_lines: Vec<String>,
    /// In emission order; the parameter type comes last
    pub attributes: Vec<AttributeSpec>,
}

impl ParameterDeclaration {
    fn from_group(schema: &Schema, group: &ParameterGroup) -> Self {
        let type_name = schema.syntax_name(group.type_id);
        let binding = &group.binding;

        let mut attributes = vec![attributes::parameter(&ParameterBinding {
            parameter_set: group.parameter_set.as_deref(),
            position: binding.position,
            mandatory: binding.mandatory,
            dont_show: binding.dont_show,
            value_from_pipeline: binding.from_pipeline,
            help_message: &group.help,
        })];
        if let Some(category) = binding.category {
            attributes.push(attributes::category(category));
        }
        if let Some(info) = &binding.info {
            let possible_types = info
                .possible_types
                .iter()
                .map(|t| schema.syntax_name(*t))
                .collect();
            attributes.push(attributes::info(info, possible_types));
        }
        if let Some(completer) = &binding.completer {
            let completion_type = schema
                .complex_root(group.type_id)
                .unwrap_or(group.type_id);
            attributes.push(attributes::argument_completer(
                completer,
                &schema.syntax_name(completion_type),
            ));
        }
        if !group.aliases.is_empty() {
            attributes.push(attributes::alias(&group.aliases));
        }
        if group.validation.not_null {
            attributes.push(attributes::validate_not_null());
        }
        attributes.push(attributes::parameter_type(&type_name));

        Self {
            name: group.name.clone(),
            type_name,
            help_lines: group
                .help
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            attributes,
        }
    }

    pub fn attribute(&self, kind: attributes::AttributeKind) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.kind == kind)
    }

    fn to_directives(&self, is_last: bool) -> Vec<Directive> {
        let mut out: Vec<Directive> = self.help_lines.iter().map(Directive::comment).collect();
        out.extend(self.attributes.iter().cloned().map(Directive::attribute));
        let separator = if is_last { "" } else { "," };
        out.push(Directive::literal(format!("{}{separator}", self.name)));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxySurface {
    pub command: String,
    pub documentation: Documentation,
    /// Command-level attributes in emission order
    pub attributes: Vec<AttributeSpec>,
    pub parameters: Vec<ParameterDeclaration>,
    pub dispatch: DispatchTable,
    pub forwarding: ForwardingPlan,
    #[serde(skip)]
    half_indent: usize,
}

impl ProxySurface {
    pub fn build(group: &VariantGroup, config: &GenerationConfig) -> Self {
        let schema = group.schema();

        let mut documentation = Documentation::synthesize(group);
        if !config.include_complex_notes {
            documentation.notes.clear();
        }

        let mut command_attributes = Vec::new();
        if !group.output_types().is_empty() {
            let names: Vec<String> = group
                .output_types()
                .iter()
                .map(|t| schema.syntax_name(*t))
                .collect();
            command_attributes.push(attributes::output_type(&names));
        }
        command_attributes.push(attributes::cmdlet_binding(
            group.default_parameter_set(),
            config.positional_binding,
            group.supports_should_process(),
            &config.confirm_impact,
        ));
        for profile in group.profiles() {
            command_attributes.push(attributes::profile(profile));
        }
        if !group.description().is_empty() {
            command_attributes.push(attributes::description(group.description()));
        }

        let parameters = group
            .parameter_groups()
            .iter()
            .map(|g| ParameterDeclaration::from_group(schema, g))
            .collect();

        let dispatch = DispatchTable::from_group(group);
        let forwarding = ForwardingPlan::from_table(&dispatch);

        Self {
            command: group.command_name().to_string(),
            documentation,
            attributes: command_attributes,
            parameters,
            dispatch,
            forwarding,
            half_indent: config.half_indent,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDeclaration> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn to_directives(&self) -> Vec<Directive> {
        let mut body = self.documentation.help_directives(self.half_indent);
        body.push(Directive::Blank);
        body.extend(self.attributes.iter().cloned().map(Directive::attribute));

        let mut parameters = Vec::new();
        let count = self.parameters.len();
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                parameters.push(Directive::Blank);
            }
            parameters.extend(parameter.to_directives(index + 1 == count));
        }
        body.push(Directive::block("param", parameters));
        body.push(Directive::Blank);
        body.extend(self.forwarding.to_directives());

        vec![Directive::block(format!("function {}", self.command), body)]
    }

    pub fn render(&self, renderer: &dyn Renderer) -> String {
        renderer.render(&self.to_directives())
    }
}
