//! # variantgen
//!
//! Merges several operation signatures ("variants") that share one external
//! command name into a single proxy command, and forwards invocations of that
//! proxy to exactly one implementation.
//!
//! ## Pipeline
//!
//! 1. [`Schema`] and [`Variant`] describe the input. Both are immutable.
//! 2. [`VariantGroup::new`] merges the variants of one command into
//!    [`ParameterGroup`]s, picks the default parameter set and rejects
//!    signatures that parameter sets cannot express.
//! 3. [`DispatchTable`] maps parameter-set names to implementations.
//! 4. [`ProxyForwarder`] runs the begin/process/end protocol against the
//!    resolved implementation; [`ForwardingPlan`] describes it for emission.
//! 5. [`Documentation`] holds help text, syntax lines and complex parameter
//!    notes.
//! 6. [`ProxySurface`] combines the above into ordered [`Directive`]s that a
//!    [`Renderer`] turns into text.
//!
//! [`ProxyGenerator`] runs steps 2 to 6 for many commands, in parallel, and
//! isolates per-command failures.

pub mod attributes;
pub mod complex;
pub mod config;
pub mod docs;
pub mod emit;
pub mod error;
pub mod forwarder;
pub mod generator;
pub mod group;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod surface;

pub use attributes::{AttributeKind, AttributeOption, AttributeSpec, AttributeValue};
pub use complex::{ComplexInterfaceInfo, ComplexInterfaceTree, NodeId};
pub use config::GenerationConfig;
pub use docs::{ComplexNote, Documentation, NoteLine, ParameterHelp, SyntaxLine, SyntaxToken};
pub use emit::{Directive, Renderer, TextRenderer};
pub use error::{
    AmbiguousDefaultError, ConstructionError, DispatchError, ErrorSeverity, GenerationError,
    Severity,
};
pub use forwarder::{
    ActiveForward, BoundParameters, ForwardStep, ForwardingPlan, ImplementationFactory, Phase,
    PhasePlan, ProxyForwarder, SteppablePipeline,
};
pub use generator::{CommandSource, GenerationReport, GroupFailure, ProxyGenerator};
pub use group::{
    DefaultParameterSet, MergedBinding, ParameterGroup, ParameterRef, VariantGroup, VariantId,
    ALL_PARAMETER_SETS,
};
pub use model::{
    Completer, ImplementationId, Parameter, ParameterCategory, ParameterInfo, ValidationFlags,
    Variant,
};
pub use resolver::DispatchTable;
pub use schema::{Property, Schema, SchemaBuilder, TypeDef, TypeId, TypeKind};
pub use surface::{ParameterDeclaration, ProxySurface};

/// Result type for variant group construction
pub type Result<T> = std::result::Result<T, ConstructionError>;
