//! Installed libraries and discoverable projects.
//!
//! Libraries live as plain git checkouts directly under the library root, one
//! directory per library. Projects are directories under the project root
//! that carry a CMake manifest.

pub mod errors;

use anyhow::{Context, Result};
use errors::GitError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{Level, debug, info, span};
use walkdir::WalkDir;

/// What [`LibraryStore::install`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    /// The library was cloned fresh.
    Cloned,
    /// An existing checkout was updated with `git pull`.
    Updated,
}

/// The directory holding installed libraries.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    root: PathBuf,
}

impl LibraryStore {
    /// Creates a store rooted at `root`. The directory is not touched.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Library root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a library is (or would be) installed in.
    #[must_use]
    pub fn library_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Whether a library directory exists.
    #[must_use]
    pub fn is_installed(&self, name: &str) -> bool {
        self.library_dir(name).is_dir()
    }

    /// Names of installed libraries, sorted. Hidden directories are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the library root cannot be read.
    pub fn installed(&self) -> Result<Vec<String>> {
        child_directories(&self.root)
            .map(|dirs| dirs.into_iter().map(|(name, _)| name).collect())
            .with_context(|| format!("Failed to list libraries in {}", self.root.display()))
    }

    /// Clone `url` into the library directory, or `git pull` if it already
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns a [`GitError`] (wrapped) if git is missing or the git command
    /// fails.
    pub fn install(&self, name: &str, url: &str) -> Result<InstallAction> {
        let span = span!(Level::DEBUG, "install_library", library = name, url);
        let _guard = span.enter();

        let git = which::which("git").map_err(|_| GitError::Missing)?;
        let dir = self.library_dir(name);
        let dir_arg = dir.to_string_lossy();

        if dir.exists() {
            info!(dir = %dir.display(), "Updating existing checkout");
            run_git(&git, &["-C", dir_arg.as_ref(), "pull"], "git pull")?;
            Ok(InstallAction::Updated)
        } else {
            std::fs::create_dir_all(&self.root).with_context(|| {
                format!("Failed to create library root {}", self.root.display())
            })?;
            info!(dir = %dir.display(), "Cloning");
            run_git(&git, &["clone", url, dir_arg.as_ref()], "git clone")?;
            Ok(InstallAction::Cloned)
        }
    }
}

/// Library name as used on disk: a trailing `.git` is dropped.
#[must_use]
pub fn normalize_library_name(name: &str) -> &str {
    name.strip_suffix(".git").unwrap_or(name)
}

/// Whether `dir` looks like a buildable project (has a manifest).
#[must_use]
pub fn is_project(dir: &Path, manifest_name: &str) -> bool {
    dir.is_dir() && dir.join(manifest_name).is_file()
}

/// Names of the projects under `root`, sorted. A missing root has none.
///
/// # Errors
///
/// Returns an error if `root` exists but cannot be read.
pub fn projects(root: &Path, manifest_name: &str) -> Result<Vec<String>> {
    if !root.is_dir() {
        debug!(root = %root.display(), "Project root does not exist");
        return Ok(Vec::new());
    }

    let dirs = child_directories(root)
        .with_context(|| format!("Failed to list projects in {}", root.display()))?;
    Ok(dirs
        .into_iter()
        .filter(|(_, path)| is_project(path, manifest_name))
        .map(|(name, _)| name)
        .collect())
}

/// Immediate, non-hidden subdirectories of `root`, sorted by name.
fn child_directories(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        dirs.push((name, entry.into_path()));
    }
    Ok(dirs)
}

fn run_git(git: &Path, args: &[&str], label: &str) -> Result<()> {
    debug!(?args, "Running git");
    let output = Command::new(git)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to run {label}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::from_stderr(label, &stderr).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_installed_lists_directories_only() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("ws2812"))?;
        fs::create_dir(dir.path().join("pbinstr"))?;
        fs::create_dir(dir.path().join(".cache"))?;
        fs::write(dir.path().join("README.md"), "notes")?;

        let store = LibraryStore::new(dir.path().to_path_buf());
        assert_eq!(store.installed()?, vec!["pbinstr", "ws2812"]);
        assert!(store.is_installed("pbinstr"));
        assert!(!store.is_installed("README.md"));
        Ok(())
    }

    #[test]
    fn test_installed_with_missing_root_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = LibraryStore::new(dir.path().join("nowhere"));
        assert!(store.installed()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_projects_require_manifest() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("blink"))?;
        fs::write(dir.path().join("blink/CMakeLists.txt"), "project(blink)\n")?;
        fs::create_dir(dir.path().join("scratch"))?;

        assert_eq!(projects(dir.path(), "CMakeLists.txt")?, vec!["blink"]);
        assert!(is_project(&dir.path().join("blink"), "CMakeLists.txt"));
        assert!(!is_project(&dir.path().join("scratch"), "CMakeLists.txt"));
        Ok(())
    }

    #[test]
    fn test_projects_missing_root() -> Result<()> {
        let dir = tempdir()?;
        assert!(projects(&dir.path().join("missing"), "CMakeLists.txt")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_normalize_library_name() {
        assert_eq!(normalize_library_name("pbinstr.git"), "pbinstr");
        assert_eq!(normalize_library_name("pbinstr"), "pbinstr");
    }
}
