//! Error types for variantgen configuration

use thiserror::Error;
use variantgen::GenerationError;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError { source: Box<figment::Error> },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ValidationError { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

impl From<GenerationError> for ConfigError {
    fn from(error: GenerationError) -> Self {
        match error {
            GenerationError::ConfigValidation(message) => ConfigError::ValidationError { message },
        }
    }
}
