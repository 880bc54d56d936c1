//! Configuration provider using Figment

use crate::discovery::{ConfigFile, ConfigFormat, FileDiscovery};
use crate::ConfigResult;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::Serialize;
use tracing::{debug, trace};
use variantgen::GenerationConfig;

/// Prefix of environment variables read as configuration
pub const ENV_PREFIX: &str = "VARIANTGEN_";

/// Values given explicitly on the command line; unset fields are ignored
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_indent: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positional_binding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_complex_notes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_variants_per_group: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

/// Loads [`GenerationConfig`] from all sources
///
/// Sources are merged in precedence order (later sources override earlier ones):
/// 1. Default values
/// 2. Global then project configuration files
/// 3. `VARIANTGEN_` environment variables
/// 4. Command line overrides
///
/// Nothing is cached; every load reads the sources again.
#[derive(Debug, Default)]
pub struct ConfigProvider {
    discovery: FileDiscovery,
    overrides: ConfigOverrides,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discovery(mut self, discovery: FileDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load and validate the generation configuration
    pub fn load(&self) -> ConfigResult<GenerationConfig> {
        let config: GenerationConfig = self.build_figment().extract()?;
        config.validate()?;
        debug!(?config, "Loaded generation configuration");
        Ok(config)
    }

    fn build_figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(GenerationConfig::default()));

        for config_file in self.discovery.discover_all() {
            trace!(
                "Loading config file: {} ({:?})",
                config_file.path.display(),
                config_file.format
            );
            figment = figment.merge(Self::file_provider(&config_file));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
            .merge(Serialized::defaults(&self.overrides))
    }

    fn file_provider(config_file: &ConfigFile) -> Figment {
        let path = &config_file.path;
        match config_file.format {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        }
    }
}
