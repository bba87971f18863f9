use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create parent directories for {}", path.display())
        })?;
    }
    Ok(())
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Some(path_str) = path.to_str() else {
        return Ok(path.to_path_buf());
    };

    if path_str == "~" {
        return dirs::home_dir().context("Could not find home directory");
    }
    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not find home directory")?;
        return Ok(home.join(rest));
    }
    Ok(path.to_path_buf())
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(path))
    }
}

/// Tilde-expands and absolutizes a configured root, creating it if needed
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the directory cannot be
/// created
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    let resolved = make_absolute(&expand_tilde(path)?)?;
    fs::create_dir_all(&resolved)
        .with_context(|| format!("Failed to create directory: {}", resolved.display()))?;
    Ok(resolved)
}

/// Whether `path` names an existing directory
#[must_use]
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Path rendered with forward slashes, as CMake expects
#[must_use]
pub fn to_cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_file = temp_dir.path().join("a/b/c/file.txt");

        ensure_parent_dirs(&nested_file).unwrap();
        assert!(nested_file.parent().unwrap().exists());
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();

        let tilde_path = PathBuf::from("~/.pclibs");
        let result = expand_tilde(&tilde_path).unwrap();
        assert_eq!(result, home.join(".pclibs"));

        let just_tilde = PathBuf::from("~");
        let result = expand_tilde(&just_tilde).unwrap();
        assert_eq!(result, home);

        let no_tilde = PathBuf::from("/absolute/path");
        let result = expand_tilde(&no_tilde).unwrap();
        assert_eq!(result, no_tilde);

        let not_home = PathBuf::from("~user/libs");
        assert_eq!(expand_tilde(&not_home).unwrap(), not_home);
    }

    #[test]
    fn test_make_absolute() {
        let absolute = PathBuf::from("/absolute/path");
        let result = make_absolute(&absolute).unwrap();
        assert_eq!(result, absolute);

        let relative = PathBuf::from("relative/path");
        let result = make_absolute(&relative).unwrap();
        assert!(result.is_absolute());
        assert!(result.ends_with("relative/path"));
    }

    #[test]
    fn test_resolve_root_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("libs/pico");

        let resolved = resolve_root(&root).unwrap();
        assert_eq!(resolved, root);
        assert!(directory_exists(&root));
    }

    #[test]
    fn test_to_cmake_path() {
        assert_eq!(
            to_cmake_path(Path::new("C:\\Users\\dev\\.pclibs\\pbinstr")),
            "C:/Users/dev/.pclibs/pbinstr"
        );
        assert_eq!(to_cmake_path(Path::new("/home/dev/.pclibs/x")), "/home/dev/.pclibs/x");
    }
}
