//! Parameter-set to implementation lookup
//!
//! The choice of implementation is made when the group is built: every
//! variant of a multi-variant command owns a distinct parameter-set name. At
//! runtime the proxy only looks the caller's set name up in a [`DispatchTable`].

use crate::error::DispatchError;
use crate::group::VariantGroup;
use crate::model::ImplementationId;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchTable {
    /// Single-variant command: forward without looking anything up
    Unconditional {
        command: String,
        implementation: ImplementationId,
    },
    /// One entry per variant, keyed by parameter-set name, in variant order
    ByParameterSet {
        command: String,
        entries: IndexMap<String, ImplementationId>,
    },
}

impl DispatchTable {
    pub fn from_group(group: &VariantGroup) -> Self {
        let command = group.command_name().to_string();
        match group.variants() {
            [only] => DispatchTable::Unconditional {
                command,
                implementation: only.implementation.clone(),
            },
            variants => DispatchTable::ByParameterSet {
                command,
                entries: variants
                    .iter()
                    .map(|v| (v.name.clone(), v.implementation.clone()))
                    .collect(),
            },
        }
    }

    pub fn command(&self) -> &str {
        match self {
            DispatchTable::Unconditional { command, .. }
            | DispatchTable::ByParameterSet { command, .. } => command,
        }
    }

    /// Implementation addressed by `parameter_set`
    ///
    /// Unconditional tables ignore the set name. A name missing from a lookup
    /// table is an error and is never replaced by a fallback.
    pub fn resolve(&self, parameter_set: &str) -> Result<&ImplementationId, DispatchError> {
        match self {
            DispatchTable::Unconditional { implementation, .. } => Ok(implementation),
            DispatchTable::ByParameterSet { command, entries } => {
                entries
                    .get(parameter_set)
                    .ok_or_else(|| DispatchError::UnmappedParameterSet {
                        command: command.clone(),
                        parameter_set: parameter_set.to_string(),
                    })
            }
        }
    }

    pub fn is_unconditional(&self) -> bool {
        matches!(self, DispatchTable::Unconditional { .. })
    }

    /// `(parameter set, implementation)` pairs; empty for unconditional tables
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ImplementationId)> {
        let entries = match self {
            DispatchTable::Unconditional { .. } => None,
            DispatchTable::ByParameterSet { entries, .. } => Some(entries),
        };
        entries
            .into_iter()
            .flat_map(|e| e.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Number of distinct implementations reachable through this table
    pub fn len(&self) -> usize {
        match self {
            DispatchTable::Unconditional { .. } => 1,
            DispatchTable::ByParameterSet { entries, .. } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
