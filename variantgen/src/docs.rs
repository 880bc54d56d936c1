//! Help text, syntax lines and complex parameter notes for one command
//!
//! [`Documentation::synthesize`] is a pure function of its [`VariantGroup`]:
//! synthesizing twice yields equal values and byte-identical renders.

use crate::complex::{ComplexInterfaceInfo, ComplexInterfaceTree};
use crate::emit::Directive;
use crate::group::{ParameterGroup, VariantGroup, VariantId};
use crate::model::{ParameterCategory, Variant};
use crate::schema::Schema;
use serde::Serialize;
use std::fmt;

pub const COMPLEX_PARAMETER_HEADER: &str = "COMPLEX PARAMETER PROPERTIES\n\
To create the parameters described below, construct a hash table containing the appropriate properties. \
For information on hash tables, run Get-Help about_Hash_Tables.";

/// Parameter-set label for parameters shared by every set
pub const ALL_SETS_LABEL: &str = "(All)";

/// One `-Name <Type>` element of a syntax line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxToken {
    pub name: String,
    /// `None` for switches, which take no value
    pub type_name: Option<String>,
    pub mandatory: bool,
    /// The name may be omitted because the value binds by position
    pub positional: bool,
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mandatory {
            f.write_str("[")?;
        }
        if self.positional {
            write!(f, "[-{}]", self.name)?;
        } else {
            write!(f, "-{}", self.name)?;
        }
        if let Some(type_name) = &self.type_name {
            write!(f, " <{type_name}>")?;
        }
        if !self.mandatory {
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Usage of one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxLine {
    pub command: String,
    /// `None` when the command has a single variant
    pub parameter_set: Option<String>,
    pub tokens: Vec<SyntaxToken>,
}

impl fmt::Display for SyntaxLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for token in &self.tokens {
            write!(f, " {token}")?;
        }
        Ok(())
    }
}

/// Structured help for one parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterHelp {
    pub name: String,
    pub type_name: String,
    pub description: String,
    pub required: bool,
    /// Position number, or `named`
    pub position: String,
    pub pipeline_input: bool,
    pub parameter_sets: Vec<String>,
    pub aliases: Vec<String>,
    pub globbing: bool,
    pub dynamic: bool,
    pub default_value: Option<String>,
    pub category: Option<ParameterCategory>,
}

/// One rendered line of a complex parameter note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteLine {
    pub depth: usize,
    pub bulleted: bool,
    pub text: String,
}

impl NoteLine {
    pub fn render(&self, half_indent: usize) -> String {
        let indent = " ".repeat(self.depth * half_indent);
        let bullet = if self.bulleted { "- " } else { "" };
        format!("{indent}{bullet}{}", self.text)
    }
}

/// Property listing for one structured parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexNote {
    pub parameter: String,
    pub lines: Vec<NoteLine>,
}

impl ComplexNote {
    pub fn from_tree(tree: &ComplexInterfaceTree) -> Self {
        let lines = tree
            .walk()
            .into_iter()
            .map(|(depth, node)| NoteLine {
                depth,
                bulleted: depth > 0,
                text: note_text(node),
            })
            .collect();
        Self {
            parameter: tree.root().name.clone(),
            lines,
        }
    }
}

fn note_text(node: &ComplexInterfaceInfo) -> String {
    let entry = if node.switch {
        node.name.clone()
    } else {
        format!("{} <{}>", node.name, node.type_name)
    };
    if node.required {
        format!("{entry}: {}", node.description)
    } else {
        format!("[{entry}]: {}", node.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Documentation {
    pub command: String,
    pub synopsis: String,
    pub description: String,
    pub example: String,
    pub link: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub parameters: Vec<ParameterHelp>,
    pub syntax: Vec<SyntaxLine>,
    /// Ordered by parameter name
    pub notes: Vec<ComplexNote>,
}

impl Documentation {
    pub fn synthesize(group: &VariantGroup) -> Self {
        let schema = group.schema();
        let description = group.description().to_string();
        let link = group.link().to_string();

        let mut inputs: Vec<String> = Vec::new();
        for parameter_group in group.parameter_groups() {
            if parameter_group.binding.from_pipeline {
                let name = schema.syntax_name(parameter_group.type_id);
                if !inputs.contains(&name) {
                    inputs.push(name);
                }
            }
        }
        let outputs = group
            .output_types()
            .iter()
            .map(|t| schema.syntax_name(*t))
            .collect();

        let parameters = group
            .parameter_groups()
            .iter()
            .filter(|g| !g.binding.dont_show)
            .map(|g| parameter_help(schema, g))
            .collect();

        let syntax = group
            .variant_ids()
            .filter_map(|id| group.variant(id).map(|v| (id, v)))
            .map(|(id, variant)| syntax_line(group, id, variant))
            .collect();

        let mut notes: Vec<ComplexNote> = group
            .parameter_groups()
            .iter()
            .filter_map(|g| g.complex_interface.as_ref())
            .map(ComplexNote::from_tree)
            .collect();
        notes.sort_by(|a, b| a.parameter.cmp(&b.parameter));

        Self {
            command: group.command_name().to_string(),
            synopsis: description.clone(),
            example: format!(
                "To view examples, please use the -Online parameter with Get-Help or navigate to: {link}"
            ),
            description,
            link,
            inputs,
            outputs,
            parameters,
            syntax,
            notes,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterHelp> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Help block as comment directives, one line each
    pub fn help_directives(&self, half_indent: usize) -> Vec<Directive> {
        let mut lines: Vec<String> = vec![
            ".Synopsis".to_string(),
            self.synopsis.clone(),
            ".Description".to_string(),
            self.description.clone(),
            ".Example".to_string(),
            self.example.clone(),
        ];
        for input in &self.inputs {
            lines.push(".Inputs".to_string());
            lines.push(input.clone());
        }
        for output in &self.outputs {
            lines.push(".Outputs".to_string());
            lines.push(output.clone());
        }
        if !self.notes.is_empty() {
            lines.push(".Notes".to_string());
            lines.extend(COMPLEX_PARAMETER_HEADER.lines().map(str::to_string));
            for note in &self.notes {
                lines.push(String::new());
                lines.extend(note.lines.iter().map(|l| l.render(half_indent)));
            }
        }
        lines.push(".Link".to_string());
        lines.push(self.link.clone());

        lines.into_iter().map(Directive::comment).collect()
    }

    /// Syntax lines as comment directives
    pub fn syntax_directives(&self) -> Vec<Directive> {
        self.syntax
            .iter()
            .map(|line| Directive::comment(line.to_string()))
            .collect()
    }
}

fn parameter_help(schema: &Schema, group: &ParameterGroup) -> ParameterHelp {
    let binding = &group.binding;
    ParameterHelp {
        name: group.name.clone(),
        type_name: schema.syntax_name(group.type_id),
        description: group.help.clone(),
        required: binding.mandatory,
        position: binding
            .position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "named".to_string()),
        pipeline_input: binding.from_pipeline,
        parameter_sets: match &group.parameter_set {
            Some(set) => vec![set.clone()],
            None => vec![ALL_SETS_LABEL.to_string()],
        },
        aliases: group.aliases.clone(),
        globbing: group.validation.globbing,
        dynamic: group.validation.dynamic,
        default_value: binding.default_value.clone(),
        category: binding.category,
    }
}

fn syntax_line(group: &VariantGroup, id: VariantId, variant: &Variant) -> SyntaxLine {
    let schema = group.schema();
    let visible = variant.parameters.iter().filter(|p| !p.dont_show);

    let mut positional: Vec<_> = visible
        .clone()
        .filter(|p| p.is_positional_mandatory())
        .collect();
    positional.sort_by_key(|p| p.position);
    let named = visible.clone().filter(|p| p.mandatory && p.position.is_none());
    let optional = visible.filter(|p| !p.mandatory);

    let tokens = positional
        .into_iter()
        .chain(named)
        .chain(optional)
        .map(|p| SyntaxToken {
            name: p.name.clone(),
            type_name: (!schema.is_switch(p.type_id)).then(|| schema.syntax_name(p.type_id)),
            mandatory: p.mandatory,
            positional: p.position.is_some(),
        })
        .collect();

    SyntaxLine {
        command: group.command_name().to_string(),
        parameter_set: group.parameter_set_name(id).map(str::to_string),
        tokens,
    }
}
