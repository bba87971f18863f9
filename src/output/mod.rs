//! User-facing messages for the `pman` CLI.
//!
//! Routine messages are dimmed, warnings and errors bold. Everything goes to
//! stderr so stdout stays clean for listings and diffs. Informational output
//! honors the global verbosity (quiet, normal, verbose).

use crate::library::errors::GitError;
use crate::manifest::ManifestError;
use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.green());
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Category of a failed command: the type of the first manifest or git error
/// in the chain, else `Error`.
#[must_use]
pub fn error_heading(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| {
            cause
                .downcast_ref::<ManifestError>()
                .map(ManifestError::error_type)
                .or_else(|| cause.downcast_ref::<GitError>().map(GitError::error_type))
        })
        .unwrap_or("Error")
}

/// Prints a failed command with its full context chain (always shown).
pub fn report(err: &anyhow::Error) {
    error(&format!("{}: {err:#}", error_heading(err)));
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a verbose debug message (only in verbose mode).
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a git-style action message with dimmed verb and normal message.
pub fn action(verb: &str, message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", verb.dimmed().bold(), message);
}

/// Maps the global `--verbose`/`--quiet` flags to a verbosity level.
/// Quiet wins when both are given.
#[must_use]
pub const fn verbosity_from_flags(verbose: bool, quiet: bool) -> Verbosity {
    if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(verbosity_from_flags(false, false), Verbosity::Normal);
        assert_eq!(verbosity_from_flags(true, false), Verbosity::Verbose);
        assert_eq!(verbosity_from_flags(true, true), Verbosity::Quiet);
    }

    #[test]
    fn test_error_heading_names_known_errors() {
        let missing = anyhow::Error::from(ManifestError::NotFound("blink/CMakeLists.txt".into()))
            .context("Failed to open project 'blink'");
        assert_eq!(error_heading(&missing), "Not Found");

        let git = anyhow::Error::from(GitError::Missing).context("Failed to install 'pbinstr'");
        assert_eq!(error_heading(&git), "Missing Git");

        assert_eq!(error_heading(&anyhow::anyhow!("Project not found: nope")), "Error");
    }

    // Single test so parallel tests never interleave on the global level
    #[test]
    fn test_verbosity_round_trip() {
        let levels = [Verbosity::Quiet, Verbosity::Verbose, Verbosity::Normal];
        for level in &levels {
            set_verbosity(*level);
            assert_eq!(get_verbosity(), *level);
        }
    }
}
