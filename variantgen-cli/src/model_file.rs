//! Model file loading
//!
//! A model file lists named `types` and the `commands` to generate, in YAML or
//! JSON. Types are referred to by name; `Name[]` is an array of `Name`,
//! `Name?` is a nullable `Name` and `switch` is the presence-only flag type.
//!
//! ```yaml
//! types:
//!   - name: String
//!     kind: scalar
//!   - name: Thing
//!     kind: object
//!     properties:
//!       - name: Name
//!         type: String
//!         required: true
//! commands:
//!   - name: Get-Thing
//!     variants:
//!       - name: ByName
//!         module: Things.Private
//!         command: Get-Thing_ByName
//!         parameters:
//!           - name: Name
//!             type: String
//!             mandatory: true
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use variantgen::schema::SWITCH_TYPE_NAME;
use variantgen::{
    CommandSource, Completer, ImplementationId, Parameter, ParameterCategory, ParameterInfo,
    Property, Schema, SchemaBuilder, TypeId, TypeKind, ValidationFlags, Variant,
};

/// Type name accepted for switch parameters besides the schema's own name
pub const SWITCH_ALIAS: &str = "switch";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML model: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("Invalid JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Type '{0}' is defined more than once")]
    DuplicateType(String),

    #[error("Unknown type '{name}' referenced by {context}")]
    UnknownTypeName { name: String, context: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelFile {
    pub types: Vec<TypeEntry>,
    pub commands: Vec<CommandEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub shape: TypeShape,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeShape {
    Scalar,
    Enum {
        values: Vec<String>,
    },
    Object {
        #[serde(default)]
        properties: Vec<PropertyEntry>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub serialized_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandEntry {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<VariantEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantEntry {
    pub name: String,
    pub module: String,
    pub command: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub supports_should_process: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub output_types: Vec<String>,
    #[serde(default)]
    pub profiles: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub pipeline: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub globbing: bool,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub category: Option<ParameterCategory>,
    #[serde(default)]
    pub completer: Option<Completer>,
    #[serde(default)]
    pub info: Option<InfoEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InfoEntry {
    pub serialized_name: Option<String>,
    pub required: bool,
    pub read_only: bool,
    pub possible_types: Vec<String>,
    pub description: String,
}

/// A model file with its type names resolved against one schema
#[derive(Debug)]
pub struct LoadedModel {
    pub schema: Arc<Schema>,
    pub commands: Vec<CommandSource>,
}

impl LoadedModel {
    pub fn command(&self, name: &str) -> Option<&CommandSource> {
        self.commands.iter().find(|c| c.name == name)
    }
}

impl ModelFile {
    /// Read a model file; `.json` files are parsed as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, ModelError> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build the schema and convert every command to a [`CommandSource`]
    pub fn resolve(self) -> Result<LoadedModel, ModelError> {
        let mut builder = Schema::builder();
        let mut seen = HashSet::new();

        // Declare every name first so properties may refer to types listed later.
        let mut declared = Vec::with_capacity(self.types.len());
        for entry in &self.types {
            if !seen.insert(entry.name.as_str()) {
                return Err(ModelError::DuplicateType(entry.name.clone()));
            }
            let id = match &entry.shape {
                TypeShape::Scalar => builder.scalar(entry.name.as_str()),
                TypeShape::Enum { values } => {
                    builder.enumeration(entry.name.as_str(), values.clone())
                }
                TypeShape::Object { .. } => builder.declare(entry.name.as_str()),
            };
            if !entry.description.is_empty() {
                builder.describe(id, entry.description.as_str());
            }
            declared.push(id);
        }

        for (entry, id) in self.types.iter().zip(declared) {
            if let TypeShape::Object { properties } = &entry.shape {
                let properties = properties
                    .iter()
                    .map(|p| property(&mut builder, &entry.name, p))
                    .collect::<Result<Vec<_>, _>>()?;
                builder.define(id, TypeKind::Object { properties });
            }
        }

        let commands = self
            .commands
            .into_iter()
            .map(|command| {
                let variants = command
                    .variants
                    .into_iter()
                    .map(|v| variant(&mut builder, &command.name, v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CommandSource::new(command.name, variants))
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        let schema = builder.build();
        debug!(
            types = schema.len(),
            commands = commands.len(),
            "resolved model file"
        );
        Ok(LoadedModel {
            schema: Arc::new(schema),
            commands,
        })
    }
}

/// Load and resolve a model file in one step
pub fn load_model(path: &Path) -> Result<LoadedModel, ModelError> {
    ModelFile::load(path)?.resolve()
}

fn resolve_type(builder: &mut SchemaBuilder, name: &str, context: &str) -> Result<TypeId, ModelError> {
    let name = name.trim();
    if let Some(element) = name.strip_suffix("[]") {
        let element = resolve_type(builder, element, context)?;
        return Ok(builder.array_of(element));
    }
    if let Some(inner) = name.strip_suffix('?') {
        let inner = resolve_type(builder, inner, context)?;
        return Ok(builder.nullable(inner));
    }
    if name == SWITCH_ALIAS || name == SWITCH_TYPE_NAME {
        return Ok(builder.switch());
    }
    builder
        .lookup(name)
        .ok_or_else(|| ModelError::UnknownTypeName {
            name: name.to_string(),
            context: context.to_string(),
        })
}

fn property(
    builder: &mut SchemaBuilder,
    owner: &str,
    entry: &PropertyEntry,
) -> Result<Property, ModelError> {
    let context = format!("property '{}.{}'", owner, entry.name);
    let type_id = resolve_type(builder, &entry.type_name, &context)?;

    let mut property = Property::new(entry.name.as_str(), type_id);
    if entry.required {
        property = property.required();
    }
    if entry.read_only {
        property = property.read_only();
    }
    if !entry.description.is_empty() {
        property = property.with_description(entry.description.as_str());
    }
    if let Some(serialized) = &entry.serialized_name {
        property = property.with_serialized_name(serialized.as_str());
    }
    Ok(property)
}

fn variant(builder: &mut SchemaBuilder, command: &str, entry: VariantEntry) -> Result<Variant, ModelError> {
    let context = format!("variant '{}' of '{}'", entry.name, command);

    let mut variant = Variant::new(entry.name, ImplementationId::new(entry.module, entry.command))
        .with_description(entry.description)
        .with_link(entry.link);
    variant.is_default = entry.default;
    variant.supports_should_process = entry.supports_should_process;
    for output in &entry.output_types {
        variant = variant.with_output_type(resolve_type(builder, output, &context)?);
    }
    for profile in entry.profiles {
        variant = variant.with_profile(profile);
    }
    for parameter_entry in entry.parameters {
        variant = variant.with_parameter(parameter(builder, &context, parameter_entry)?);
    }
    Ok(variant)
}

fn parameter(
    builder: &mut SchemaBuilder,
    context: &str,
    entry: ParameterEntry,
) -> Result<Parameter, ModelError> {
    let context = format!("parameter '{}' of {}", entry.name, context);
    let type_id = resolve_type(builder, &entry.type_name, &context)?;

    let info = match entry.info {
        Some(info) => {
            let possible_types = info
                .possible_types
                .iter()
                .map(|t| resolve_type(builder, t, &context))
                .collect::<Result<Vec<_>, _>>()?;
            Some(ParameterInfo {
                serialized_name: info.serialized_name,
                required: info.required,
                read_only: info.read_only,
                possible_types,
                description: info.description,
            })
        }
        None => None,
    };

    let mut parameter = Parameter::new(entry.name, type_id).with_help(entry.help);
    parameter.mandatory = entry.mandatory;
    parameter.position = entry.position;
    parameter.from_pipeline = entry.pipeline;
    parameter.default_value = entry.default;
    parameter.aliases = entry.aliases;
    parameter.validation = ValidationFlags {
        not_null: entry.not_null,
        globbing: entry.globbing,
        dynamic: entry.dynamic,
    };
    parameter.dont_show = entry.hidden;
    parameter.category = entry.category;
    parameter.completer = entry.completer;
    parameter.info = info;
    Ok(parameter)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
types:
  - name: String
    kind: scalar
  - name: Parent
    kind: object
    description: A node with children
    properties:
      - name: Name
        type: String
        required: true
      - name: Children
        type: Child[]
  - name: Child
    kind: object
    properties:
      - name: Parent
        type: Parent
commands:
  - name: Get-Thing
    variants:
      - name: A
        module: Things.Private
        command: Get-Thing_A
        default: true
        parameters:
          - name: Name
            type: String
            mandatory: true
            aliases: [N]
          - name: Force
            type: switch
      - name: B
        module: Things.Private
        command: Get-Thing_B
        output_types: [Parent]
        parameters:
          - name: Name
            type: String
            mandatory: true
          - name: Root
            type: Parent?
            pipeline: true
"#;

    #[test]
    fn test_resolve_yaml_model() {
        let model = ModelFile::from_yaml(MODEL).unwrap().resolve().unwrap();

        let string = model.schema.find("String").unwrap();
        let parent = model.schema.find("Parent").unwrap();
        assert!(model.schema.find("Child[]").is_some());
        assert_eq!(model.schema.get(parent).unwrap().description, "A node with children");

        let command = model.command("Get-Thing").unwrap();
        assert_eq!(command.variants.len(), 2);

        let a = &command.variants[0];
        assert!(a.is_default);
        assert_eq!(a.implementation.to_string(), "Things.Private\\Get-Thing_A");
        let name = a.parameter("Name").unwrap();
        assert_eq!(name.type_id, string);
        assert!(name.mandatory);
        assert_eq!(name.aliases, vec!["N".to_string()]);
        assert!(model.schema.is_switch(a.parameter("Force").unwrap().type_id));

        let b = &command.variants[1];
        assert_eq!(b.output_types, vec![parent]);
        assert!(b.parameter("Root").unwrap().from_pipeline);
    }

    #[test]
    fn test_resolve_json_model() {
        let json = r#"{
            "types": [{"name": "Int32", "kind": "scalar"}],
            "commands": [{
                "name": "Set-Value",
                "variants": [{
                    "name": "C",
                    "module": "Things.Private",
                    "command": "Set-Value_C",
                    "parameters": [{"name": "Value", "type": "Int32", "mandatory": true, "position": 0}]
                }]
            }]
        }"#;
        let model = ModelFile::from_json(json).unwrap().resolve().unwrap();
        let value = model.commands[0].variants[0].parameter("Value").unwrap();
        assert_eq!(value.position, Some(0));
    }

    #[test]
    fn test_unknown_type_is_reported_with_context() {
        let yaml = r#"
commands:
  - name: Get-Thing
    variants:
      - name: A
        module: M
        command: C
        parameters:
          - name: Name
            type: Missing
"#;
        let error = ModelFile::from_yaml(yaml).unwrap().resolve().unwrap_err();
        match error {
            ModelError::UnknownTypeName { name, context } => {
                assert_eq!(name, "Missing");
                assert!(context.contains("parameter 'Name'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let yaml = r#"
types:
  - name: String
    kind: scalar
  - name: String
    kind: enum
    values: [A]
"#;
        let error = ModelFile::from_yaml(yaml).unwrap().resolve().unwrap_err();
        assert!(matches!(error, ModelError::DuplicateType(name) if name == "String"));
    }
}
