//! Configuration file discovery and loading.

use crate::config::merger::merge_configs;
use crate::config::schema::RexConfig;
use crate::error::{Result, RexError};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding rex configuration inside a project.
pub const CONFIG_DIR: &str = ".rex";

/// Paths to configuration files in merge order (later overrides earlier).
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .rex/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .rex/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
            project_local: existing(project_root.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project
            .iter()
            .chain(self.project_local.iter())
            .collect()
    }

    /// Check if any config file exists.
    pub fn is_empty(&self) -> bool {
        self.project.is_none() && self.project_local.is_none()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Find the project root by walking up from `start`.
///
/// The nearest directory containing `.rex` wins; `.git` is the fallback
/// marker.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RexError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RexError::Io(e)
        }
    })
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<RexConfig> {
    let content = read_config(path)?;
    parse_config(&content, path)
}

/// Parse YAML content into a [`RexConfig`].
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<RexConfig> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| RexError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
    from_value(merge_configs(&[value]), source_path)
}

/// Load a config file as a raw YAML value, for merging.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = read_config(path)?;

    serde_yaml::from_str(&content).map_err(|e| RexError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn from_value(value: serde_yaml::Value, source_path: &Path) -> Result<RexConfig> {
    serde_yaml::from_value(value).map_err(|e| RexError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the project's config files.
///
/// A project without any config file gets the defaults.
pub fn load_merged_config(project_root: &Path) -> Result<RexConfig> {
    let paths = ConfigPaths::discover(project_root);

    if paths.is_empty() {
        tracing::debug!("No config under {}, using defaults", project_root.display());
        return Ok(RexConfig::default());
    }

    let mut configs = Vec::new();
    for path in paths.all_existing() {
        tracing::debug!("Loading config {}", path.display());
        configs.push(load_config_value(path)?);
    }

    from_value(
        merge_configs(&configs),
        &project_root.join(CONFIG_DIR).join("config.yml"),
    )
}

/// Load config with optional path override.
///
/// If `config_override` is provided, loads only that file without merging.
/// Otherwise, discovers and merges the project's config files.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<RexConfig> {
    if let Some(override_path) = config_override {
        load_config_file(override_path)
    } else {
        load_merged_config(project_root)
    }
}
