//! Variant model: one concrete operation signature and its parameters
//!
//! Everything here is supplied once by the upstream schema collaborator and is
//! never mutated after a [`VariantGroup`](crate::group::VariantGroup) is built
//! from it.

use crate::schema::TypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The private command a proxy forwards to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImplementationId {
    pub module: String,
    pub command: String,
}

impl ImplementationId {
    pub fn new(module: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            command: command.into(),
        }
    }
}

impl fmt::Display for ImplementationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.module, self.command)
    }
}

/// Where a parameter travels in the underlying API request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterCategory {
    Path,
    Query,
    Header,
    Body,
    Uri,
    Runtime,
}

impl fmt::Display for ParameterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterCategory::Path => "Path",
            ParameterCategory::Query => "Query",
            ParameterCategory::Header => "Header",
            ParameterCategory::Body => "Body",
            ParameterCategory::Uri => "Uri",
            ParameterCategory::Runtime => "Runtime",
        };
        f.write_str(name)
    }
}

/// Source of tab-completion candidates for a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "script", rename_all = "snake_case")]
pub enum Completer {
    /// A completion script supplied by the API description
    Script(String),
    /// Complete from the values of the parameter's own type
    FromType,
}

/// Serialization facts about a parameter that maps onto a model property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    #[serde(default)]
    pub serialized_name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub possible_types: Vec<TypeId>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFlags {
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub globbing: bool,
    #[serde(default)]
    pub dynamic: bool,
}

impl ValidationFlags {
    /// Flags set on either side
    pub fn union(self, other: ValidationFlags) -> ValidationFlags {
        ValidationFlags {
            not_null: self.not_null || other.not_null,
            globbing: self.globbing || other.globbing,
            dynamic: self.dynamic || other.dynamic,
        }
    }
}

/// One input of one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_id: TypeId,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub from_pipeline: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub validation: ValidationFlags,
    #[serde(default)]
    pub dont_show: bool,
    #[serde(default)]
    pub category: Option<ParameterCategory>,
    #[serde(default)]
    pub completer: Option<Completer>,
    #[serde(default)]
    pub info: Option<ParameterInfo>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
            mandatory: false,
            position: None,
            from_pipeline: false,
            default_value: None,
            help: String::new(),
            aliases: Vec::new(),
            validation: ValidationFlags::default(),
            dont_show: false,
            category: None,
            completer: None,
            info: None,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn at_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn from_pipeline(mut self) -> Self {
        self.from_pipeline = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.validation.not_null = true;
        self
    }

    pub fn globbing(mut self) -> Self {
        self.validation.globbing = true;
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.validation.dynamic = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.dont_show = true;
        self
    }

    pub fn with_category(mut self, category: ParameterCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_completer(mut self, completer: Completer) -> Self {
        self.completer = Some(completer);
        self
    }

    pub fn with_info(mut self, info: ParameterInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Mandatory and bound by position rather than by name
    pub fn is_positional_mandatory(&self) -> bool {
        self.mandatory && self.position.is_some()
    }
}

/// One concrete parameter signature of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub implementation: ImplementationId,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub supports_should_process: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub output_types: Vec<TypeId>,
    #[serde(default)]
    pub profiles: Vec<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>, implementation: ImplementationId) -> Self {
        Self {
            name: name.into(),
            implementation,
            parameters: Vec::new(),
            is_default: false,
            supports_should_process: false,
            description: String::new(),
            link: String::new(),
            output_types: Vec::new(),
            profiles: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn supports_should_process(mut self) -> Self {
        self.supports_should_process = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn with_output_type(mut self, type_id: TypeId) -> Self {
        self.output_types.push(type_id);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profiles.push(profile.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// First parameter name that appears more than once, if any
    pub fn duplicate_parameter(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.parameters
            .iter()
            .map(|p| p.name.as_str())
            .find(|name| !seen.insert(*name))
    }

    /// `(name, type)` pairs in declaration order
    pub fn signature(&self) -> Vec<(&str, TypeId)> {
        self.parameters
            .iter()
            .map(|p| (p.name.as_str(), p.type_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn test_parameter_builder_pattern() {
        let mut builder = Schema::builder();
        let string = builder.scalar("String");

        let parameter = Parameter::new("Name", string)
            .mandatory()
            .at_position(0)
            .with_alias("N")
            .with_help("The resource name")
            .not_null();

        assert!(parameter.mandatory);
        assert_eq!(parameter.position, Some(0));
        assert_eq!(parameter.aliases, vec!["N".to_string()]);
        assert!(parameter.validation.not_null);
        assert!(!parameter.validation.globbing);
        assert!(parameter.is_positional_mandatory());
    }

    #[test]
    fn test_duplicate_parameter_detection() {
        let mut builder = Schema::builder();
        let string = builder.scalar("String");
        let variant = Variant::new("Get", ImplementationId::new("Private", "Get_Get"))
            .with_parameter(Parameter::new("Name", string))
            .with_parameter(Parameter::new("Id", string))
            .with_parameter(Parameter::new("Name", string));

        assert_eq!(variant.duplicate_parameter(), Some("Name"));
        assert!(variant.parameter("Id").is_some());
        assert!(variant.parameter("Missing").is_none());
    }

    #[test]
    fn test_implementation_display() {
        let id = ImplementationId::new("Az.Private", "Get-Thing_List");
        assert_eq!(id.to_string(), "Az.Private\\Get-Thing_List");
    }

    #[test]
    fn test_validation_flags_union() {
        let a = ValidationFlags {
            not_null: true,
            ..Default::default()
        };
        let b = ValidationFlags {
            dynamic: true,
            ..Default::default()
        };
        let merged = a.union(b);
        assert!(merged.not_null);
        assert!(merged.dynamic);
        assert!(!merged.globbing);
    }
}
