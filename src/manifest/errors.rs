use std::fmt;
use std::path::PathBuf;

/// Failures when reading or writing a manifest file.
///
/// A manifest without any recognizable directive is not an error: the editor
/// falls back to appending. An edit that changes nothing is reported through
/// the edit outcome, not here.
#[derive(Debug)]
pub enum ManifestError {
    /// The manifest file does not exist
    NotFound(PathBuf),
    /// The manifest exists but could not be read
    Read {
        /// Manifest path
        path: PathBuf,
        /// Underlying I/O error message
        message: String,
    },
    /// The manifest is not valid UTF-8
    InvalidUtf8 {
        /// Manifest path
        path: PathBuf,
    },
    /// Writing the new manifest failed; the previous content is intact
    WriteFailure {
        /// Manifest path
        path: PathBuf,
        /// Underlying I/O error message
        message: String,
    },
}

impl ManifestError {
    /// Get a user-friendly error message with actionable guidance
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(path) => format!(
                "Manifest not found: {}\n\nSuggestions:\n\
                 - Check the project name ('pman projects' lists known projects)\n\
                 - Make sure the project has a CMakeLists.txt at its root",
                path.display()
            ),
            Self::Read { path, message } => {
                format!("Failed to read manifest {}: {message}", path.display())
            }
            Self::InvalidUtf8 { path } => format!(
                "Manifest {} is not valid UTF-8 and was left untouched",
                path.display()
            ),
            Self::WriteFailure { path, message } => format!(
                "Failed to write manifest {}: {message}\n\n\
                 The previous content was not modified.",
                path.display()
            ),
        }
    }

    /// Get a short description of the error type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Not Found",
            Self::Read { .. } => "Read Error",
            Self::InvalidUtf8 { .. } => "Invalid Encoding",
            Self::WriteFailure { .. } => "Write Failure",
        }
    }
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ManifestError {}
