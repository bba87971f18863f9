#![warn(missing_docs)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Offsets and counters are bounded by the manifest length
#![allow(clippy::indexing_slicing)] // Bounds checked by the scanner

//! # Picoman - CMake library manager for Pico projects
//!
//! Picoman installs libraries as git checkouts and wires them into the
//! `CMakeLists.txt` of Raspberry Pi Pico style projects: an
//! `add_subdirectory(...)` line for the library sources plus an entry in the
//! project's `target_link_libraries(...)` block. Removing a library undoes
//! both edits and leaves the rest of the manifest alone.
//!
//! ## Architecture
//!
//! - [`manifest`]: the manifest editing engine (scanner, add/remove, file I/O)
//! - [`library`]: installed libraries, git retrieval and project discovery
//! - [`commands`]: command implementations (install, add, remove, ...)
//! - [`config`]: configuration parsing and validation
//! - [`output`]: user-facing messages and verbosity
//! - [`diff`]: unified diffs for `--dry-run`
//! - [`utils`]: path helpers
//!
//! ## Example Usage
//!
//! ```
//! use picoman::manifest::{LinkChange, add_library};
//!
//! let manifest = "add_executable(blink main.c)\n\
//!                 target_link_libraries(blink\n    pico_stdlib\n)\n";
//! let edited = add_library(manifest, "pbinstr", "/libs/pbinstr", "blink");
//!
//! assert!(edited.changed);
//! assert!(matches!(edited.outcome.link, LinkChange::Appended { .. }));
//! assert!(edited.text.contains("    pbinstr\n)"));
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Diff generation for manifest previews.
pub mod diff;

/// Installed libraries, git retrieval and project discovery.
pub mod library;

/// CMake manifest scanning and editing.
pub mod manifest;

/// Output formatting and verbosity.
pub mod output;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Current version of the pman binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/picoman/config";

/// Default library root directory name within the home directory.
pub const DEFAULT_LIB_DIR: &str = ".pclibs";

/// Default project root directory name within the home directory.
pub const DEFAULT_PROJECTS_DIR: &str = "PicoProjects";

/// Central context for all picoman operations.
///
/// Holds the resolved library and project roots plus the loaded
/// configuration. Commands receive it explicitly; nothing reads the
/// environment after construction.
///
/// # Examples
///
/// ```no_run
/// use picoman::PicomanContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Create context from the default config and environment
/// let ctx = PicomanContext::new()?;
///
/// // Create context with custom paths (for testing)
/// let ctx = PicomanContext::new_explicit(
///     "/tmp/pico/libs".into(),
///     "/tmp/pico/projects".into(),
///     "/tmp/pico/config".into(),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PicomanContext {
    /// Directory holding installed libraries.
    pub lib_root: PathBuf,

    /// Directory holding projects.
    pub project_root: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl PicomanContext {
    /// Creates a new `PicomanContext` by loading the configuration from the
    /// default path. `PICOMAN_CONFIG_PATH`, `PICOMAN_LIB_PATH` and
    /// `PICOMAN_PROJECTS_PATH` override the configured locations.
    ///
    /// Both roots are created when missing.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined, the
    /// configuration cannot be read or created, or a root cannot be created.
    pub fn new() -> Result<Self> {
        let config_path = if let Ok(path) = std::env::var("PICOMAN_CONFIG_PATH") {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)?;

        // Validate configuration and warn about issues
        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            output::warning(&format!("Warning: Configuration validation failed: {e}"));
        }

        let lib_root = std::env::var("PICOMAN_LIB_PATH")
            .map_or_else(|_| config.paths.lib_path.clone(), PathBuf::from);
        let project_root = std::env::var("PICOMAN_PROJECTS_PATH")
            .map_or_else(|_| config.paths.projects_path.clone(), PathBuf::from);

        Ok(Self {
            lib_root: utils::paths::resolve_root(&lib_root)?,
            project_root: utils::paths::resolve_root(&project_root)?,
            config_path,
            config,
        })
    }

    /// Creates a new `PicomanContext` with explicit paths for testing.
    /// This avoids the need for environment variable manipulation.
    ///
    /// The configuration is loaded from `config_path`, or written there with
    /// defaults (and the given roots) when missing.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created, or
    /// a root cannot be created.
    pub fn new_explicit(
        lib_root: PathBuf,
        project_root: PathBuf,
        config_path: PathBuf,
    ) -> Result<Self> {
        let config = if config_path.exists() {
            config::Config::load(&config_path)?
        } else {
            let mut config = config::Config::default();
            config.paths.lib_path.clone_from(&lib_root);
            config.paths.projects_path.clone_from(&project_root);
            config.save(&config_path)?;
            config
        };

        Ok(Self {
            lib_root: utils::paths::resolve_root(&lib_root)?,
            project_root: utils::paths::resolve_root(&project_root)?,
            config_path,
            config,
        })
    }

    /// Manifest editor configured from `[manifest]`.
    #[must_use]
    pub fn editor(&self) -> manifest::ManifestEditor {
        manifest::ManifestEditor::new(
            self.config.manifest.indent,
            self.config.manifest.binary_dir.clone(),
        )
    }

    /// Installed libraries under the library root.
    #[must_use]
    pub fn library_store(&self) -> library::LibraryStore {
        library::LibraryStore::new(self.lib_root.clone())
    }

    /// Resolves a project argument: a project name under the project root,
    /// or a path to an existing directory.
    ///
    /// # Errors
    /// Returns an error if neither names an existing directory.
    pub fn resolve_project(&self, project: &str) -> Result<PathBuf> {
        let under_root = self.project_root.join(project);
        if utils::paths::directory_exists(&under_root) {
            return Ok(under_root);
        }

        let as_path = utils::paths::expand_tilde(Path::new(project))?;
        if utils::paths::directory_exists(&as_path) {
            return utils::paths::make_absolute(&as_path);
        }

        Err(anyhow::anyhow!(
            "Project not found: '{project}' is neither a project in {} nor an existing directory. \
             Run 'pman projects' to list known projects.",
            self.project_root.display()
        ))
    }

    /// Path of the manifest inside a project directory.
    #[must_use]
    pub fn manifest_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.config.manifest.file_name)
    }
}
