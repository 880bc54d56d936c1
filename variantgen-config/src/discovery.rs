//! Configuration file discovery
//!
//! Files named `variantgen.{toml,yaml,yml,json}` are looked up in the global
//! directory (`~/.variantgen/`) and the project directory (`./.variantgen/`).
//! Project files take precedence over global ones.

use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Directory name used in both scopes
pub const CONFIG_DIR_NAME: &str = ".variantgen";

const FILE_NAMES: [&str; 4] = [
    "variantgen.toml",
    "variantgen.yaml",
    "variantgen.yml",
    "variantgen.json",
];

/// A discovered configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub scope: ConfigScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where a configuration file was found; later scopes override earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigScope {
    Global,
    Project,
}

/// Finds configuration files in the global and project directories
#[derive(Debug, Default)]
pub struct FileDiscovery {
    project_dir: Option<PathBuf>,
    global_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Discovery rooted at the current directory and the home directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery rooted at explicit directories (each containing the config files directly)
    pub fn with_directories(project_dir: Option<PathBuf>, global_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            global_dir,
        }
    }

    /// All configuration files, lowest precedence first
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let global_dir = self.global_dir.clone().or_else(Self::resolve_global_dir);
        let project_dir = self.project_dir.clone().or_else(Self::resolve_project_dir);

        let mut files = Vec::new();
        if let Some(dir) = &global_dir {
            files.extend(Self::search_directory(dir, ConfigScope::Global));
        }
        if let Some(dir) = &project_dir {
            files.extend(Self::search_directory(dir, ConfigScope::Project));
        }
        files.sort_by_key(|f| f.scope);

        debug!("Discovered {} configuration files", files.len());
        files
    }

    fn search_directory(dir: &Path, scope: ConfigScope) -> Vec<ConfigFile> {
        if !dir.exists() {
            trace!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }
        if !dir.is_dir() {
            warn!("Path exists but is not a directory: {}", dir.display());
            return Vec::new();
        }

        FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .filter(|path| path.is_file())
            .filter_map(|path| {
                let format = ConfigFormat::from_extension(path.extension()?.to_str()?)?;
                trace!("Found config: {} ({:?})", path.display(), format);
                Some(ConfigFile {
                    path,
                    format,
                    scope,
                })
            })
            .collect()
    }

    fn resolve_project_dir() -> Option<PathBuf> {
        let dir = std::env::current_dir().ok()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }

    fn resolve_global_dir() -> Option<PathBuf> {
        let dir = dirs::home_dir()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }
}
