use super::errors::ManifestError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{Level, debug, span};

/// Read a manifest fully into memory.
///
/// # Errors
///
/// Returns [`ManifestError::NotFound`] if the file does not exist,
/// [`ManifestError::InvalidUtf8`] if it is not UTF-8 and
/// [`ManifestError::Read`] for any other I/O failure.
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ManifestError::NotFound(path.to_path_buf())
        } else {
            ManifestError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    })?;

    let text = simdutf8::basic::from_utf8(&bytes).map_err(|_| ManifestError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;

    Ok(text.to_owned())
}

/// Replace a manifest with `text` in one step.
///
/// The text goes to a temporary file next to the manifest which is then
/// renamed over it, so readers see either the old or the new content. The
/// original file's permissions are carried over.
///
/// # Errors
///
/// Returns [`ManifestError::WriteFailure`] if the temporary file cannot be
/// created, written or persisted. The original file is untouched in that case.
pub fn write_manifest(path: &Path, text: &str) -> Result<(), ManifestError> {
    let span = span!(Level::DEBUG, "write_manifest", path = %path.display());
    let _guard = span.enter();

    let failure = |e: std::io::Error| ManifestError::WriteFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(failure)?;
    temp.write_all(text.as_bytes()).map_err(failure)?;
    temp.as_file().sync_all().map_err(failure)?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions()).map_err(failure)?;
    }

    temp.persist(path).map_err(|e| failure(e.error))?;
    debug!(bytes = text.len(), "Manifest written");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_manifest_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("CMakeLists.txt");

        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(p) if p == path));
    }

    #[test]
    fn test_read_rejects_invalid_utf8() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("CMakeLists.txt");
        fs::write(&path, [b'a', 0xFF, b'b'])?;

        assert!(matches!(
            read_manifest(&path),
            Err(ManifestError::InvalidUtf8 { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_write_replaces_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("CMakeLists.txt");
        fs::write(&path, "add_executable(Old old.c)\n")?;

        write_manifest(&path, "add_executable(New new.c)\n")?;

        assert_eq!(read_manifest(&path)?, "add_executable(New new.c)\n");
        // No temporary files left behind
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_permissions() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let path = dir.path().join("CMakeLists.txt");
        fs::write(&path, "project(x)\n")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640))?;

        write_manifest(&path, "project(y)\n")?;

        let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        Ok(())
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("CMakeLists.txt");

        assert!(matches!(
            write_manifest(&path, "project(x)\n"),
            Err(ManifestError::WriteFailure { .. })
        ));
    }
}
