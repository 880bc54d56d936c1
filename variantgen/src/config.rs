//! Generation settings

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};

/// Configuration for proxy generation behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Spaces per half indent; one nesting level is two half indents
    pub half_indent: usize,

    /// Separator between attribute options and list items
    pub item_separator: String,

    /// Whether unnamed arguments may bind by position
    pub positional_binding: bool,

    /// Impact level declared by commands that support confirmation
    pub confirm_impact: String,

    /// Whether help carries complex parameter notes
    pub include_complex_notes: bool,

    /// Maximum number of variants per command (safety limit)
    pub max_variants_per_group: usize,

    /// Whether independent commands are generated in parallel
    pub parallel: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            half_indent: 2,
            item_separator: ", ".to_string(),
            positional_binding: false,
            confirm_impact: "Medium".to_string(),
            include_complex_notes: true,
            max_variants_per_group: 64,
            parallel: true,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.half_indent == 0 {
            return Err(GenerationError::ConfigValidation(
                "half_indent must be greater than 0".to_string(),
            ));
        }

        if self.item_separator.is_empty() {
            return Err(GenerationError::ConfigValidation(
                "item_separator cannot be empty".to_string(),
            ));
        }

        if self.max_variants_per_group == 0 {
            return Err(GenerationError::ConfigValidation(
                "max_variants_per_group must be greater than 0".to_string(),
            ));
        }

        if self.confirm_impact.trim().is_empty() {
            return Err(GenerationError::ConfigValidation(
                "confirm_impact cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// One full nesting level
    pub fn indent(&self) -> String {
        " ".repeat(self.half_indent * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.indent(), "    ");
    }

    #[test]
    fn test_config_validation() {
        let config = GenerationConfig {
            half_indent: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            item_separator: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            max_variants_per_group: 0,
            ..Default::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("max_variants_per_group"));
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: GenerationConfig = serde_json::from_str(r#"{"half_indent": 4}"#).unwrap();
        assert_eq!(config.half_indent, 4);
        assert_eq!(config.item_separator, ", ");
        assert!(config.parallel);
    }
}
