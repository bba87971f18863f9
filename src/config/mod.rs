//! Persistent `pman` settings: library and project roots, manifest
//! formatting and the library registry.

/// Reading and validating the TOML file.
pub mod parser;
/// Unknown and deprecated field warnings.
pub mod validator;

use crate::manifest::DEFAULT_MANIFEST_NAME;
use crate::manifest::editor::{DEFAULT_BINARY_DIR, DEFAULT_INDENT};
use crate::utils::paths::ensure_parent_dirs;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Bounds accepted for `manifest.indent`.
pub const INDENT_RANGE: std::ops::RangeInclusive<usize> = 1..=16;

/// Contents of `~/.config/picoman/config`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Where libraries and projects live
    #[serde(default)]
    pub paths: PathsConfig,

    /// How manifests are found and written
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Library registry: name -> git repository URL
    #[serde(default)]
    pub libraries: BTreeMap<String, String>,
}

/// `[paths]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathsConfig {
    /// Library root, tilde allowed
    #[serde(default = "default_lib_path")]
    pub lib_path: PathBuf,
    /// Project root; `pico_projects_path` is the old name
    #[serde(default = "default_projects_path", alias = "pico_projects_path")]
    pub projects_path: PathBuf,
}

/// `[manifest]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestConfig {
    /// Manifest file name inside a project directory
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Build output root for `add_subdirectory` lines
    #[serde(default = "default_binary_dir")]
    pub binary_dir: String,
    /// Spaces per entry in rewritten link blocks
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            lib_path: default_lib_path(),
            projects_path: default_projects_path(),
        }
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            binary_dir: default_binary_dir(),
            indent: default_indent(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML or invalid values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dirs(path)?;

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Repository URL registered for a library
    #[must_use]
    pub fn library_url(&self, name: &str) -> Option<&str> {
        self.libraries.get(name).map(String::as_str)
    }

    /// Register or update a library URL
    pub fn set_library(&mut self, name: String, url: String) {
        self.libraries.insert(name, url);
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, name) = key.split_once('.')?;

        match (section, name) {
            ("paths", "lib_path") => Some(self.paths.lib_path.display().to_string()),
            ("paths", "projects_path") => Some(self.paths.projects_path.display().to_string()),
            ("manifest", "file_name") => Some(self.manifest.file_name.clone()),
            ("manifest", "binary_dir") => Some(self.manifest.binary_dir.clone()),
            ("manifest", "indent") => Some(self.manifest.indent.to_string()),
            ("libraries", library) => self.libraries.get(library).cloned(),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key (e.g., indent out of range)
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {key}"))?;

        match (section, name) {
            ("paths", "lib_path") => self.paths.lib_path = PathBuf::from(value),
            ("paths", "projects_path") => self.paths.projects_path = PathBuf::from(value),
            ("manifest", "file_name") => {
                parser::validate_file_name(&value)?;
                self.manifest.file_name = value;
            }
            ("manifest", "binary_dir") => {
                if value.trim().is_empty() {
                    anyhow::bail!("Binary directory cannot be empty");
                }
                self.manifest.binary_dir = value;
            }
            ("manifest", "indent") => {
                let indent: usize = value
                    .parse()
                    .with_context(|| format!("Invalid indent: {value}"))?;
                parser::validate_indent(indent)?;
                self.manifest.indent = indent;
            }
            ("libraries", library) if !library.is_empty() => {
                self.set_library(library.to_string(), value);
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }

    /// Unset a configuration value by key
    ///
    /// Path and manifest settings fall back to their defaults; registry
    /// entries are removed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown or cannot be unset
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {key}"))?;

        match (section, name) {
            ("paths", "lib_path") => self.paths.lib_path = default_lib_path(),
            ("paths", "projects_path") => self.paths.projects_path = default_projects_path(),
            ("manifest", "file_name") => self.manifest.file_name = default_file_name(),
            ("manifest", "binary_dir") => self.manifest.binary_dir = default_binary_dir(),
            ("manifest", "indent") => self.manifest.indent = default_indent(),
            ("libraries", library) => {
                if self.libraries.remove(library).is_none() {
                    anyhow::bail!("Library '{library}' is not registered");
                }
            }
            _ => return Err(anyhow::anyhow!("Cannot unset configuration key: {key}")),
        }
        Ok(())
    }
}

// Default functions for serde
fn default_lib_path() -> PathBuf {
    PathBuf::from(format!("~/{}", crate::DEFAULT_LIB_DIR))
}

fn default_projects_path() -> PathBuf {
    PathBuf::from(format!("~/{}", crate::DEFAULT_PROJECTS_DIR))
}

fn default_file_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

fn default_binary_dir() -> String {
    DEFAULT_BINARY_DIR.to_string()
}

const fn default_indent() -> usize {
    DEFAULT_INDENT
}
