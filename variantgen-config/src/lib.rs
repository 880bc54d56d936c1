//! Layered configuration for variantgen using Figment
//!
//! [`GenerationConfig`] is assembled from these sources, later ones winning:
//!
//! 1. Built-in defaults
//! 2. Global file: `~/.variantgen/variantgen.{toml,yaml,yml,json}`
//! 3. Project file: `./.variantgen/variantgen.{toml,yaml,yml,json}`
//! 4. Environment variables prefixed with `VARIANTGEN_` (for example
//!    `VARIANTGEN_HALF_INDENT=4`)
//! 5. Command line overrides ([`ConfigOverrides`])
//!
//! The merged result is validated before it is returned.
//!
//! ```no_run
//! use variantgen_config::load_config;
//!
//! let config = load_config()?;
//! println!("indent: {:?}", config.indent());
//! # Ok::<(), variantgen_config::ConfigError>(())
//! ```

pub mod discovery;
pub mod error;
pub mod provider;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery, CONFIG_DIR_NAME};
pub use error::ConfigError;
pub use provider::{ConfigOverrides, ConfigProvider, ENV_PREFIX};
pub use variantgen::GenerationConfig;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load configuration from the default locations without command line overrides
pub fn load_config() -> ConfigResult<GenerationConfig> {
    ConfigProvider::new().load()
}

#[cfg(test)]
mod tests;
