use std::fmt;

/// Categorized git failures while fetching a library, with actionable guidance
#[derive(Debug)]
pub enum GitError {
    /// git is not installed or not on PATH
    Missing,
    /// Network-related errors (DNS, connection timeout, unreachable)
    Network(String),
    /// Authentication failures (SSH keys, passwords, tokens)
    Authentication(String),
    /// Repository not found at the given URL
    NotFound(String),
    /// Local changes block an update
    Conflict(String),
    /// File system permission errors
    Permission(String),
    /// Unknown or uncategorized error
    Unknown(String),
}

impl GitError {
    /// Parse git command stderr to categorize the error
    #[must_use]
    pub fn from_stderr(command: &str, stderr: &str) -> Self {
        let stderr_lower = stderr.to_lowercase();
        let details = extract_meaningful_message(stderr);

        if stderr_lower.contains("could not resolve host")
            || stderr_lower.contains("connection timed out")
            || stderr_lower.contains("network is unreachable")
            || stderr_lower.contains("failed to connect")
            || stderr_lower.contains("connection refused")
        {
            return Self::Network(format!("{command}: Network error - {details}"));
        }

        if stderr_lower.contains("authentication failed")
            || stderr_lower.contains("publickey")
            || stderr_lower.contains("could not read username")
            || stderr_lower.contains("invalid credentials")
        {
            return Self::Authentication(format!("{command}: Authentication failed - {details}"));
        }

        if stderr_lower.contains("repository not found")
            || stderr_lower.contains("does not exist")
            || stderr_lower.contains("not found")
            || stderr_lower.contains("does not appear to be a git repository")
        {
            return Self::NotFound(format!("{command}: Repository not found - {details}"));
        }

        if stderr_lower.contains("would be overwritten")
            || stderr_lower.contains("not possible to fast-forward")
            || stderr_lower.contains("conflict")
        {
            return Self::Conflict(format!("{command}: Update blocked - {details}"));
        }

        if stderr_lower.contains("permission denied")
            || stderr_lower.contains("unable to create")
            || stderr_lower.contains("read-only")
        {
            return Self::Permission(format!("{command}: Permission error - {details}"));
        }

        Self::Unknown(format!("{command}: {details}"))
    }

    /// Get a user-friendly error message with actionable guidance
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Missing => "git was not found in PATH\n\nSuggestions:\n\
                 - Install git and make sure it is on your PATH"
                .to_string(),
            Self::Network(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check your internet connection\n\
                 - Verify the repository URL is correct\n\
                 - Try again in a few moments"
            ),
            Self::Authentication(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Verify your SSH key is configured (ssh-add -l)\n\
                 - For HTTPS, you may need to set up a credential helper"
            ),
            Self::NotFound(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check the repository URL ('pman config libraries.<name>')\n\
                 - Make sure the repository is public or you have access"
            ),
            Self::Conflict(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Commit or discard local changes in the library directory\n\
                 - Remove the library directory and install it again"
            ),
            Self::Permission(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check permissions of the library directory (paths.lib_path)"
            ),
            Self::Unknown(msg) => format!(
                "{msg}\n\nThis is an unexpected error. Please check the message above for details."
            ),
        }
    }

    /// Get a short description of the error type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Missing => "Missing Git",
            Self::Network(_) => "Network Error",
            Self::Authentication(_) => "Authentication Error",
            Self::NotFound(_) => "Not Found",
            Self::Conflict(_) => "Conflict",
            Self::Permission(_) => "Permission Denied",
            Self::Unknown(_) => "Unknown Error",
        }
    }
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for GitError {}

/// Keep the first few non-empty stderr lines, which carry the actual reason
fn extract_meaningful_message(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(3)
        .collect();

    if lines.is_empty() {
        return "No error details available".to_string();
    }

    lines.join(" | ")
}
