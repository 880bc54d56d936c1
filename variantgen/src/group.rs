//! Merging variants that share one external command name
//!
//! [`VariantGroup::new`] groups parameters by `(name, type)` identity across
//! all variants. A group present in every variant is *common* and carries no
//! parameter-set name. A group present in exactly one variant is *exclusive*
//! and is tagged with that variant's name, which doubles as its parameter-set
//! name. Anything in between cannot be expressed with parameter sets and is
//! rejected.
//!
//! All derived data is computed once, in input order, so identical input
//! yields identical output.

use crate::complex::ComplexInterfaceTree;
use crate::error::{AmbiguousDefaultError, ConstructionError};
use crate::model::{Completer, Parameter, ParameterCategory, ParameterInfo, ValidationFlags, Variant};
use crate::schema::{Schema, TypeId};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default parameter-set name meaning "every parameter set applies"
pub const ALL_PARAMETER_SETS: &str = "__AllParameterSets";

/// Index of a variant inside its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VariantId(usize);

impl VariantId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One parameter occurrence: parameter `index` of variant `variant`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterRef {
    pub variant: VariantId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DefaultParameterSet {
    /// Single-variant command: every parameter set applies
    AllParameterSets,
    /// The variant flagged as default
    Named(String),
    /// Callers must always name a parameter set
    Unset,
}

impl DefaultParameterSet {
    pub fn name(&self) -> Option<&str> {
        match self {
            DefaultParameterSet::AllParameterSets => Some(ALL_PARAMETER_SETS),
            DefaultParameterSet::Named(name) => Some(name),
            DefaultParameterSet::Unset => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, DefaultParameterSet::Unset)
    }
}

/// Binding facts of a parameter merged over all of its occurrences
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedBinding {
    /// Mandatory in every occurrence
    pub mandatory: bool,
    /// Kept only when every occurrence agrees on it
    pub position: Option<u32>,
    pub from_pipeline: bool,
    pub dont_show: bool,
    pub default_value: Option<String>,
    pub category: Option<ParameterCategory>,
    pub completer: Option<Completer>,
    pub info: Option<ParameterInfo>,
}

impl MergedBinding {
    fn merge<'a>(mut occurrences: impl Iterator<Item = &'a Parameter>) -> Self {
        let Some(first) = occurrences.next() else {
            return Self::default();
        };
        let mut merged = Self {
            mandatory: first.mandatory,
            position: first.position,
            from_pipeline: first.from_pipeline,
            dont_show: first.dont_show,
            default_value: first.default_value.clone(),
            category: first.category,
            completer: first.completer.clone(),
            info: first.info.clone(),
        };
        for parameter in occurrences {
            merged.mandatory &= parameter.mandatory;
            if merged.position != parameter.position {
                merged.position = None;
            }
            merged.from_pipeline |= parameter.from_pipeline;
            merged.dont_show |= parameter.dont_show;
            if merged.default_value.is_none() {
                merged.default_value = parameter.default_value.clone();
            }
            if merged.category.is_none() {
                merged.category = parameter.category;
            }
            if merged.completer.is_none() {
                merged.completer = parameter.completer.clone();
            }
            if merged.info.is_none() {
                merged.info = parameter.info.clone();
            }
        }
        merged
    }
}

/// A parameter identity merged across the variants that declare it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterGroup {
    pub name: String,
    pub type_id: TypeId,
    /// Variants declaring this parameter, in input order
    pub members: Vec<VariantId>,
    /// Every declaration of this parameter, in input order
    pub occurrences: Vec<ParameterRef>,
    pub has_all_variants: bool,
    /// Parameter-set name for exclusive groups of multi-variant commands
    pub parameter_set: Option<String>,
    /// Help text of the first member that supplies any
    pub help: String,
    /// Aliases of all members, first-seen order, without repeats
    pub aliases: Vec<String>,
    pub validation: ValidationFlags,
    pub binding: MergedBinding,
    pub complex_interface: Option<ComplexInterfaceTree>,
}

impl ParameterGroup {
    pub fn is_common(&self) -> bool {
        self.has_all_variants
    }

    pub fn is_complex(&self) -> bool {
        self.complex_interface.is_some()
    }
}

/// Variants sharing one external command name, with derived merge data
#[derive(Debug, Clone, Serialize)]
pub struct VariantGroup {
    command_name: String,
    variants: Vec<Variant>,
    parameter_groups: Vec<ParameterGroup>,
    default_parameter_set: DefaultParameterSet,
    supports_should_process: bool,
    output_types: Vec<TypeId>,
    default_warning: Option<AmbiguousDefaultError>,
    #[serde(skip)]
    schema: Arc<Schema>,
}

#[derive(Default)]
struct Accumulator {
    members: Vec<VariantId>,
    occurrences: Vec<ParameterRef>,
    help: String,
    aliases: Vec<String>,
    validation: ValidationFlags,
}

impl VariantGroup {
    /// Merge `variants` into one command surface
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] when the variants cannot be expressed
    /// as parameter sets: no variants, repeated variant or parameter names,
    /// unknown or self-wrapping types, or a parameter shared by some but not
    /// all variants.
    ///
    /// The same name with two different types is two identities, each judged
    /// common or exclusive on its own.
    pub fn new(
        command_name: impl Into<String>,
        variants: Vec<Variant>,
        schema: Arc<Schema>,
    ) -> Result<Self, ConstructionError> {
        let command_name = command_name.into();
        Self::validate_variants(&command_name, &variants, &schema)?;

        let parameter_groups = Self::merge_parameters(&variants, &schema)?;
        let (default_parameter_set, default_warning) =
            Self::select_default(&command_name, &variants);

        let supports_should_process = variants.iter().any(|v| v.supports_should_process);
        let mut output_types = Vec::new();
        for type_id in variants.iter().flat_map(|v| v.output_types.iter()) {
            if !output_types.contains(type_id) {
                output_types.push(*type_id);
            }
        }

        if let Some(warning) = &default_warning {
            warn!(command = %command_name, "{warning}");
        }
        debug!(
            command = %command_name,
            variants = variants.len(),
            parameter_groups = parameter_groups.len(),
            default = ?default_parameter_set.name(),
            "built variant group"
        );

        Ok(Self {
            command_name,
            variants,
            parameter_groups,
            default_parameter_set,
            supports_should_process,
            output_types,
            default_warning,
            schema,
        })
    }

    fn validate_variants(
        command_name: &str,
        variants: &[Variant],
        schema: &Schema,
    ) -> Result<(), ConstructionError> {
        if variants.is_empty() {
            return Err(ConstructionError::EmptyGroup {
                command: command_name.to_string(),
            });
        }

        let mut names = HashSet::new();
        for variant in variants {
            if !names.insert(variant.name.as_str()) {
                return Err(ConstructionError::DuplicateVariant {
                    command: command_name.to_string(),
                    variant: variant.name.clone(),
                });
            }
            if let Some(parameter) = variant.duplicate_parameter() {
                return Err(ConstructionError::DuplicateParameter {
                    variant: variant.name.clone(),
                    parameter: parameter.to_string(),
                });
            }
            if let Some(parameter) = variant.parameters.iter().find(|p| !schema.contains(p.type_id)) {
                return Err(ConstructionError::UnknownType {
                    variant: variant.name.clone(),
                    parameter: parameter.name.clone(),
                    type_index: parameter.type_id.index(),
                });
            }
            if let Some(parameter) = variant
                .parameters
                .iter()
                .find(|p| schema.has_wrapper_cycle(p.type_id))
            {
                return Err(ConstructionError::WrapperCycle {
                    variant: variant.name.clone(),
                    parameter: parameter.name.clone(),
                    type_name: schema.syntax_name(parameter.type_id),
                });
            }
        }
        Ok(())
    }

    fn merge_parameters(
        variants: &[Variant],
        schema: &Schema,
    ) -> Result<Vec<ParameterGroup>, ConstructionError> {
        let mut by_identity: IndexMap<(String, TypeId), Accumulator> = IndexMap::new();

        for (variant_index, variant) in variants.iter().enumerate() {
            let variant_id = VariantId(variant_index);
            for (index, parameter) in variant.parameters.iter().enumerate() {
                let entry = by_identity
                    .entry((parameter.name.clone(), parameter.type_id))
                    .or_default();
                entry.members.push(variant_id);
                entry.occurrences.push(ParameterRef {
                    variant: variant_id,
                    index,
                });
                if entry.help.is_empty() {
                    entry.help = parameter.help.clone();
                }
                for alias in &parameter.aliases {
                    if !entry.aliases.contains(alias) {
                        entry.aliases.push(alias.clone());
                    }
                }
                entry.validation = entry.validation.union(parameter.validation);
            }
        }

        let total = variants.len();
        let multiple = total > 1;
        let mut groups = Vec::with_capacity(by_identity.len());
        for ((name, type_id), accumulated) in by_identity {
            let has_all_variants = accumulated.members.len() == total;
            let parameter_set = match (multiple, has_all_variants, accumulated.members.as_slice()) {
                (false, _, _) | (true, true, _) => None,
                (true, false, [owner]) => Some(variants[owner.0].name.clone()),
                (true, false, members) => {
                    return Err(ConstructionError::AmbiguousMembership {
                        parameter: name,
                        type_name: schema.syntax_name(type_id),
                        members: members
                            .iter()
                            .map(|id| variants[id.0].name.clone())
                            .collect(),
                        total,
                    });
                }
            };

            let binding = MergedBinding::merge(
                accumulated
                    .occurrences
                    .iter()
                    .map(|r| &variants[r.variant.0].parameters[r.index]),
            );
            let complex_interface = ComplexInterfaceTree::build(
                schema,
                &name,
                type_id,
                binding.mandatory,
                &accumulated.help,
            );

            groups.push(ParameterGroup {
                name,
                type_id,
                members: accumulated.members,
                occurrences: accumulated.occurrences,
                has_all_variants,
                parameter_set,
                help: accumulated.help,
                aliases: accumulated.aliases,
                validation: accumulated.validation,
                binding,
                complex_interface,
            });
        }
        Ok(groups)
    }

    fn select_default(
        command_name: &str,
        variants: &[Variant],
    ) -> (DefaultParameterSet, Option<AmbiguousDefaultError>) {
        if variants.len() == 1 {
            return (DefaultParameterSet::AllParameterSets, None);
        }

        let claimants: Vec<&Variant> = variants.iter().filter(|v| v.is_default).collect();
        match claimants.as_slice() {
            [only] => (DefaultParameterSet::Named(only.name.clone()), None),
            _ => (
                DefaultParameterSet::Unset,
                Some(AmbiguousDefaultError {
                    command: command_name.to_string(),
                    claimants: claimants.iter().map(|v| v.name.clone()).collect(),
                }),
            ),
        }
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.get(id.0)
    }

    pub fn variant_id(&self, name: &str) -> Option<VariantId> {
        self.variants.iter().position(|v| v.name == name).map(VariantId)
    }

    pub fn variant_ids(&self) -> impl Iterator<Item = VariantId> {
        (0..self.variants.len()).map(VariantId)
    }

    pub fn parameter_groups(&self) -> &[ParameterGroup] {
        &self.parameter_groups
    }

    /// First parameter group called `name`
    pub fn parameter_group(&self, name: &str) -> Option<&ParameterGroup> {
        self.parameter_groups.iter().find(|g| g.name == name)
    }

    /// Every parameter group called `name`, one per type it is declared with
    pub fn parameter_groups_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ParameterGroup> + 'a {
        self.parameter_groups.iter().filter(move |g| g.name == name)
    }

    pub fn parameter_group_of(&self, name: &str, type_id: TypeId) -> Option<&ParameterGroup> {
        self.parameter_groups
            .iter()
            .find(|g| g.name == name && g.type_id == type_id)
    }

    pub fn default_parameter_set(&self) -> &DefaultParameterSet {
        &self.default_parameter_set
    }

    pub fn default_warning(&self) -> Option<&AmbiguousDefaultError> {
        self.default_warning.as_ref()
    }

    pub fn supports_should_process(&self) -> bool {
        self.supports_should_process
    }

    pub fn output_types(&self) -> &[TypeId] {
        &self.output_types
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn has_multiple_variants(&self) -> bool {
        self.variants.len() > 1
    }

    /// Parameter-set name of a variant; `None` for single-variant commands
    pub fn parameter_set_name(&self, id: VariantId) -> Option<&str> {
        if self.has_multiple_variants() {
            self.variant(id).map(|v| v.name.as_str())
        } else {
            None
        }
    }

    /// Resolve a parameter occurrence to the variant and parameter it names
    pub fn occurrence(&self, reference: ParameterRef) -> Option<(&Variant, &Parameter)> {
        let variant = self.variant(reference.variant)?;
        let parameter = variant.parameters.get(reference.index)?;
        Some((variant, parameter))
    }

    /// Description of the first variant that has one
    pub fn description(&self) -> &str {
        self.variants
            .iter()
            .map(|v| v.description.as_str())
            .find(|d| !d.is_empty())
            .unwrap_or("")
    }

    /// Documentation link of the first variant that has one
    pub fn link(&self) -> &str {
        self.variants
            .iter()
            .map(|v| v.link.as_str())
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }

    /// Union of variant profiles, first-seen order
    pub fn profiles(&self) -> Vec<&str> {
        let mut profiles: Vec<&str> = Vec::new();
        for profile in self.variants.iter().flat_map(|v| v.profiles.iter()) {
            if !profiles.contains(&profile.as_str()) {
                profiles.push(profile);
            }
        }
        profiles
    }
}
