//! Command implementations behind the `pman` subcommands.
//!
//! Each module exposes an `execute` function taking the [`PicomanContext`]
//! and the parsed arguments.

pub mod add;
pub mod config;
pub mod install;
pub mod list;
pub mod projects;
pub mod remove;

use crate::diff::{UnifiedDiffConfig, generate_unified_diff};
use crate::manifest::{self, PROJECT_PLACEHOLDER};
use crate::{PicomanContext, output};
use anyhow::Result;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// A manifest loaded for editing.
pub(crate) struct LoadedManifest {
    pub path: PathBuf,
    pub text: String,
}

impl LoadedManifest {
    /// Resolves `project` and reads its manifest.
    pub fn open(ctx: &PicomanContext, project: &str) -> Result<Self> {
        let project_dir = ctx.resolve_project(project)?;
        let path = ctx.manifest_path(&project_dir);
        let text = manifest::read_manifest(&path)?;
        Ok(Self { path, text })
    }

    /// Explicit target, else the executable target, else `${PROJECT_NAME}`.
    pub fn target(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| manifest::executable_target(&self.text))
            .unwrap_or_else(|| PROJECT_PLACEHOLDER.to_string())
    }

    /// Writes `new_text`, or prints it as a diff when `dry_run` is set.
    pub fn store(&self, new_text: &str, dry_run: bool) -> Result<()> {
        if dry_run {
            preview(&self.path, &self.text, new_text)?;
            output::info("Dry run: manifest not modified");
            return Ok(());
        }
        manifest::write_manifest(&self.path, new_text)?;
        Ok(())
    }
}

/// Print the edit as a unified diff on stdout.
fn preview(path: &Path, old: &str, new: &str) -> Result<()> {
    let stdout = std::io::stdout();
    let config = UnifiedDiffConfig {
        colorize: stdout.is_terminal(),
        ..UnifiedDiffConfig::default()
    };
    generate_unified_diff(old, new, path, &config, &mut stdout.lock())?;
    Ok(())
}
