//! Metadata attached to the generated command and its parameters
//!
//! Each attribute is an [`AttributeSpec`]: a kind plus every option that kind
//! recognizes, each with its value and whether it is present. Renderers decide
//! how a spec looks in a target syntax and skip absent options.

use crate::group::DefaultParameterSet;
use crate::model::{Completer, ParameterCategory, ParameterInfo};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    CmdletBinding,
    OutputType,
    Parameter,
    Alias,
    ValidateNotNull,
    ArgumentCompleter,
    /// The declared type of a parameter
    ParameterType,
    Category,
    Description,
    Info,
    Profile,
}

impl AttributeKind {
    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::CmdletBinding => "CmdletBinding",
            AttributeKind::OutputType => "OutputType",
            AttributeKind::Parameter => "Parameter",
            AttributeKind::Alias => "Alias",
            AttributeKind::ValidateNotNull => "ValidateNotNull",
            AttributeKind::ArgumentCompleter => "ArgumentCompleter",
            AttributeKind::ParameterType => "ParameterType",
            AttributeKind::Category => "Category",
            AttributeKind::Description => "Description",
            AttributeKind::Info => "Info",
            AttributeKind::Profile => "Profile",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// Presence-only option, rendered by name alone
    Flag,
    Bool(bool),
    Int(i64),
    /// String literal; renderers apply their own quoting and escaping
    Str(String),
    /// Reference to a type by name
    TypeRef(String),
    /// Script body, already flattened to one line
    Script(String),
    List(Vec<AttributeValue>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeOption {
    /// `None` for positional arguments
    pub name: Option<String>,
    pub value: AttributeValue,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSpec {
    pub kind: AttributeKind,
    pub options: Vec<AttributeOption>,
}

impl AttributeSpec {
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            options: Vec::new(),
        }
    }

    /// Named presence-only option
    pub fn flag_if(mut self, present: bool, name: &str) -> Self {
        self.options.push(AttributeOption {
            name: Some(name.to_string()),
            value: AttributeValue::Flag,
            present,
        });
        self
    }

    pub fn named_if(mut self, present: bool, name: &str, value: AttributeValue) -> Self {
        self.options.push(AttributeOption {
            name: Some(name.to_string()),
            value,
            present,
        });
        self
    }

    pub fn positional(mut self, value: AttributeValue) -> Self {
        self.options.push(AttributeOption {
            name: None,
            value,
            present: true,
        });
        self
    }

    pub fn present_options(&self) -> impl Iterator<Item = &AttributeOption> {
        self.options.iter().filter(|o| o.present)
    }

    pub fn option(&self, name: &str) -> Option<&AttributeOption> {
        self.options
            .iter()
            .find(|o| o.present && o.name.as_deref() == Some(name))
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.option(name).is_some()
    }
}

/// Replace line breaks (including `<br>`) with `replacer`
pub fn single_line(value: &str, replacer: &str) -> String {
    value
        .replace("<br>", replacer)
        .replace("\r\n", replacer)
        .replace('\n', replacer)
}

pub fn cmdlet_binding(
    default: &DefaultParameterSet,
    positional_binding: bool,
    supports_should_process: bool,
    confirm_impact: &str,
) -> AttributeSpec {
    let default_name = default.name().unwrap_or_default().to_string();
    AttributeSpec::new(AttributeKind::CmdletBinding)
        .named_if(
            default.is_set(),
            "DefaultParameterSetName",
            AttributeValue::Str(default_name),
        )
        .named_if(
            true,
            "PositionalBinding",
            AttributeValue::Bool(positional_binding),
        )
        .flag_if(supports_should_process, "SupportsShouldProcess")
        .named_if(
            supports_should_process,
            "ConfirmImpact",
            AttributeValue::Str(confirm_impact.to_string()),
        )
}

pub fn output_type(type_names: &[String]) -> AttributeSpec {
    type_names
        .iter()
        .fold(AttributeSpec::new(AttributeKind::OutputType), |spec, name| {
            spec.positional(AttributeValue::Str(name.clone()))
        })
}

/// Binding options of one parameter
#[derive(Debug, Clone, Default)]
pub struct ParameterBinding<'a> {
    pub parameter_set: Option<&'a str>,
    pub position: Option<u32>,
    pub mandatory: bool,
    pub dont_show: bool,
    pub value_from_pipeline: bool,
    pub help_message: &'a str,
}

pub fn parameter(binding: &ParameterBinding<'_>) -> AttributeSpec {
    let help = single_line(binding.help_message, " ");
    AttributeSpec::new(AttributeKind::Parameter)
        .named_if(
            binding.parameter_set.is_some(),
            "ParameterSetName",
            AttributeValue::Str(binding.parameter_set.unwrap_or_default().to_string()),
        )
        .named_if(
            binding.position.is_some(),
            "Position",
            AttributeValue::Int(binding.position.map(i64::from).unwrap_or_default()),
        )
        .flag_if(binding.mandatory, "Mandatory")
        .flag_if(binding.dont_show, "DontShow")
        .flag_if(binding.value_from_pipeline, "ValueFromPipeline")
        .named_if(!help.is_empty(), "HelpMessage", AttributeValue::Str(help))
}

pub fn alias(aliases: &[String]) -> AttributeSpec {
    aliases
        .iter()
        .fold(AttributeSpec::new(AttributeKind::Alias), |spec, alias| {
            spec.positional(AttributeValue::Str(alias.clone()))
        })
}

pub fn validate_not_null() -> AttributeSpec {
    AttributeSpec::new(AttributeKind::ValidateNotNull)
}

/// Completion from a script, or from the values of `type_name`
pub fn argument_completer(completer: &Completer, type_name: &str) -> AttributeSpec {
    let value = match completer {
        Completer::Script(script) => AttributeValue::Script(single_line(script, "; ")),
        Completer::FromType => AttributeValue::TypeRef(type_name.to_string()),
    };
    AttributeSpec::new(AttributeKind::ArgumentCompleter).positional(value)
}

pub fn parameter_type(type_name: &str) -> AttributeSpec {
    AttributeSpec::new(AttributeKind::ParameterType)
        .positional(AttributeValue::TypeRef(type_name.to_string()))
}

pub fn category(category: ParameterCategory) -> AttributeSpec {
    AttributeSpec::new(AttributeKind::Category)
        .positional(AttributeValue::Str(category.to_string()))
}

pub fn description(text: &str) -> AttributeSpec {
    AttributeSpec::new(AttributeKind::Description)
        .positional(AttributeValue::Str(single_line(text, " ")))
}

pub fn info(info: &ParameterInfo, possible_type_names: Vec<String>) -> AttributeSpec {
    let description = single_line(&info.description, " ");
    AttributeSpec::new(AttributeKind::Info)
        .named_if(
            info.serialized_name.is_some(),
            "SerializedName",
            AttributeValue::Str(info.serialized_name.clone().unwrap_or_default()),
        )
        .flag_if(info.required, "Required")
        .flag_if(info.read_only, "ReadOnly")
        .named_if(
            !possible_type_names.is_empty(),
            "PossibleTypes",
            AttributeValue::List(
                possible_type_names
                    .into_iter()
                    .map(AttributeValue::TypeRef)
                    .collect(),
            ),
        )
        .named_if(
            !description.is_empty(),
            "Description",
            AttributeValue::Str(description),
        )
}

pub fn profile(name: &str) -> AttributeSpec {
    AttributeSpec::new(AttributeKind::Profile).positional(AttributeValue::Str(name.to_string()))
}
