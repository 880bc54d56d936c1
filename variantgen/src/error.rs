//! Error types for variant group construction and proxy dispatch
//!
//! Errors fall into three kinds with different propagation rules:
//!
//! - [`ConstructionError`]: the variant list of one command cannot be merged.
//!   Generation of that command stops; other commands are unaffected.
//! - [`AmbiguousDefaultError`]: no single default variant could be chosen. This
//!   is recorded on the group and generation proceeds without a default.
//! - [`DispatchError`]: a generated proxy was asked to forward to a parameter
//!   set it has no implementation for. Never retried or defaulted.

use crate::forwarder::Phase;
use serde::Serialize;
use thiserror::Error;

/// Severity levels for error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Generation continues with a documented fallback
    Warning,
    /// One command could not be generated; the rest of the run continues
    Error,
    /// An invariant of the generated artifact was violated at runtime
    Critical,
}

/// Error types that report how serious they are
pub trait Severity {
    fn severity(&self) -> ErrorSeverity;
}

/// A variant list that cannot be merged into one command surface
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ConstructionError {
    #[error("command '{command}' has no variants")]
    EmptyGroup { command: String },

    #[error("command '{command}' declares variant '{variant}' more than once")]
    DuplicateVariant { command: String, variant: String },

    #[error("variant '{variant}' declares parameter '{parameter}' more than once")]
    DuplicateParameter { variant: String, parameter: String },

    #[error(
        "parameter '{parameter}' <{type_name}> is shared by variants [{}] of {total}; \
         a parameter must belong to exactly one variant or to all of them",
        .members.join(", ")
    )]
    AmbiguousMembership {
        parameter: String,
        type_name: String,
        members: Vec<String>,
        total: usize,
    },

    #[error("parameter '{parameter}' of variant '{variant}' refers to unknown type #{type_index}")]
    UnknownType {
        variant: String,
        parameter: String,
        type_index: usize,
    },

    #[error("parameter '{parameter}' of variant '{variant}' has type <{type_name}>, which wraps itself")]
    WrapperCycle {
        variant: String,
        parameter: String,
        type_name: String,
    },

    #[error("command '{command}' has {count} variants, the limit is {limit}")]
    TooManyVariants {
        command: String,
        count: usize,
        limit: usize,
    },
}

impl Severity for ConstructionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

/// Zero or several variants of a multi-variant command claim to be the default
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}", default_message(.command, .claimants))]
pub struct AmbiguousDefaultError {
    pub command: String,
    /// Variants flagged as default, in input order
    pub claimants: Vec<String>,
}

fn default_message(command: &str, claimants: &[String]) -> String {
    if claimants.is_empty() {
        format!("no variant of '{command}' is marked as default; callers must name a parameter set")
    } else {
        format!(
            "variants [{}] of '{command}' all claim to be the default; callers must name a parameter set",
            claimants.join(", ")
        )
    }
}

impl Severity for AmbiguousDefaultError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Warning
    }
}

/// Failures raised by the forwarding logic itself
///
/// Errors raised by the forwarded implementation never pass through this type;
/// they reach the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("command '{command}' has no implementation for parameter set '{parameter_set}'")]
    UnmappedParameterSet {
        command: String,
        parameter_set: String,
    },

    #[error("cannot run the {phase} phase of '{command}': the {failed} phase already failed")]
    PhaseAfterAbort {
        command: String,
        phase: Phase,
        failed: Phase,
    },
}

impl Severity for DispatchError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }
}

/// Errors that stop a whole generation run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),
}

impl Severity for GenerationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_membership_lists_members() {
        let error = ConstructionError::AmbiguousMembership {
            parameter: "Tag".to_string(),
            type_name: "String".to_string(),
            members: vec!["A".to_string(), "B".to_string()],
            total: 3,
        };

        let message = error.to_string();
        assert!(message.contains("[A, B]"));
        assert!(message.contains("of 3"));
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_ambiguous_default_messages() {
        let none = AmbiguousDefaultError {
            command: "Get-Thing".to_string(),
            claimants: vec![],
        };
        assert!(none.to_string().contains("no variant"));

        let many = AmbiguousDefaultError {
            command: "Get-Thing".to_string(),
            claimants: vec!["List".to_string(), "Get".to_string()],
        };
        assert!(many.to_string().contains("[List, Get]"));
        assert_eq!(many.severity(), ErrorSeverity::Warning);

        let boxed: Box<dyn std::error::Error> = Box::new(many);
        assert!(boxed.source().is_none());
        assert!(boxed.to_string().starts_with("variants [List, Get] of 'Get-Thing'"));
    }

    #[test]
    fn test_dispatch_error_is_critical() {
        let error = DispatchError::UnmappedParameterSet {
            command: "Get-Thing".to_string(),
            parameter_set: "Nope".to_string(),
        };
        assert!(error.to_string().contains("'Nope'"));
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }
}
