//! Generation of many commands with per-command failure isolation

use crate::config::GenerationConfig;
use crate::error::{AmbiguousDefaultError, ConstructionError, GenerationError};
use crate::group::VariantGroup;
use crate::model::Variant;
use crate::schema::Schema;
use crate::surface::ProxySurface;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// The variants of one external command, as supplied upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSource {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl CommandSource {
    pub fn new(name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }
}

/// A command that could not be generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFailure {
    pub command: String,
    pub error: ConstructionError,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// Generated commands, in input order
    pub surfaces: Vec<ProxySurface>,
    pub failures: Vec<GroupFailure>,
    pub warnings: Vec<AmbiguousDefaultError>,
}

impl GenerationReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn surface(&self, command: &str) -> Option<&ProxySurface> {
        self.surfaces.iter().find(|s| s.command == command)
    }
}

/// Generates proxy surfaces for commands sharing one schema
///
/// Each command is built independently: a command that fails construction is
/// reported in [`GenerationReport::failures`] and the others are still
/// generated.
///
/// ```rust
/// use std::sync::Arc;
/// use variantgen::{CommandSource, ImplementationId, Parameter, ProxyGenerator, Schema, Variant};
///
/// let mut builder = Schema::builder();
/// let string = builder.scalar("String");
/// let schema = Arc::new(builder.build());
///
/// let source = CommandSource::new(
///     "Get-Thing",
///     vec![Variant::new("Get", ImplementationId::new("Private", "Get-Thing_Get"))
///         .with_parameter(Parameter::new("Name", string).mandatory())],
/// );
///
/// let report = ProxyGenerator::new(schema).generate(vec![source]).unwrap();
/// assert_eq!(report.surfaces.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ProxyGenerator {
    schema: Arc<Schema>,
    config: GenerationConfig,
}

impl ProxyGenerator {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            config: GenerationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Build the variant group of one command, enforcing the variant limit
    pub fn build_group(&self, source: CommandSource) -> Result<VariantGroup, ConstructionError> {
        let limit = self.config.max_variants_per_group;
        if source.variants.len() > limit {
            return Err(ConstructionError::TooManyVariants {
                command: source.name,
                count: source.variants.len(),
                limit,
            });
        }
        VariantGroup::new(source.name, source.variants, Arc::clone(&self.schema))
    }

    fn generate_one(&self, source: CommandSource) -> Result<(ProxySurface, Option<AmbiguousDefaultError>), GroupFailure> {
        let command = source.name.clone();
        match self.build_group(source) {
            Ok(group) => {
                let surface = ProxySurface::build(&group, &self.config);
                Ok((surface, group.default_warning().cloned()))
            }
            Err(error) => {
                warn!(command = %command, "skipping command: {error}");
                Err(GroupFailure { command, error })
            }
        }
    }

    /// Generate every command, in parallel when configured
    ///
    /// # Errors
    ///
    /// * `GenerationError::ConfigValidation` - Invalid configuration
    ///
    /// Construction errors of individual commands do not fail the run.
    pub fn generate(&self, sources: Vec<CommandSource>) -> Result<GenerationReport, GenerationError> {
        self.config.validate()?;
        debug!(
            commands = sources.len(),
            parallel = self.config.parallel,
            "generating proxies"
        );

        let results: Vec<_> = if self.config.parallel {
            sources
                .into_par_iter()
                .map(|source| self.generate_one(source))
                .collect()
        } else {
            sources
                .into_iter()
                .map(|source| self.generate_one(source))
                .collect()
        };

        let mut report = GenerationReport::default();
        for result in results {
            match result {
                Ok((surface, warning)) => {
                    report.surfaces.push(surface);
                    report.warnings.extend(warning);
                }
                Err(failure) => report.failures.push(failure),
            }
        }
        Ok(report)
    }
}
