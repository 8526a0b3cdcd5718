//! Configuration loading and validation for rex.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//!
//! # Example
//!
//! ```
//! use rex::config::load_merged_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let rex_dir = temp.path().join(".rex");
//! fs::create_dir_all(&rex_dir).unwrap();
//! fs::write(rex_dir.join("config.yml"), "translate:\n  indent_width: 2").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! config.validate().unwrap();
//! assert_eq!(config.translate.indent_width, Some(2));
//! ```
//!
//! # Configuration File Locations
//!
//! rex merges configuration in this order:
//! 1. Project config (`.rex/config.yml`)
//! 2. Local overrides (`.rex/config.local.yml`)

pub mod loader;
pub mod merger;
pub mod schema;

pub use schema::{GapSettings, RexConfig, Settings, TranslateSettings};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths,
};

pub use merger::{deep_merge, merge_configs};
