//! Command-line interface definitions for pman.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary and build tools (like xtask)
//! for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes,
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Main CLI structure for pman.
#[derive(Parser)]
#[command(
    name = "pman",
    version = crate::VERSION,
    about = "Library manager for Raspberry Pi Pico CMake projects",
    long_about = "Installs libraries from git and wires them into a project's CMakeLists.txt \
                  (add_subdirectory plus target_link_libraries), or takes them out again"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Clone a library into the library root, or update it if present
    Install {
        /// Library name (a trailing .git is ignored)
        library: String,

        /// Repository URL; recorded in the registry
        #[arg(long)]
        url: Option<String>,
    },

    /// Include and link a library in a project's CMakeLists.txt
    Add {
        /// Project name under the project root, or a project directory
        project: String,

        /// Library name
        library: String,

        /// Target to link (default: the add_executable target)
        #[arg(short, long)]
        target: Option<String>,

        /// Print the change as a diff instead of writing it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Remove a library from a project's CMakeLists.txt
    #[command(visible_alias = "rm")]
    Remove {
        /// Project name under the project root, or a project directory
        project: String,

        /// Library name
        library: String,

        /// Target to unlink from (default: the add_executable target)
        #[arg(short, long)]
        target: Option<String>,

        /// Print the change as a diff instead of writing it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// List installed libraries
    List,

    /// List projects under the project root
    #[command(visible_alias = "pplist")]
    Projects,

    /// Get and set configuration options
    Config {
        /// Configuration key (e.g. paths.lib_path, libraries.<name>)
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// Unset the configuration key
        #[arg(long)]
        unset: bool,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_options() {
        let cli = Cli::try_parse_from([
            "pman", "add", "blink", "pbinstr", "--target", "blink_app", "--dry-run", "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Add {
                project,
                library,
                target,
                dry_run,
            } => {
                assert_eq!(project, "blink");
                assert_eq!(library, "pbinstr");
                assert_eq!(target.as_deref(), Some("blink_app"));
                assert!(dry_run);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_aliases() {
        let cli = Cli::try_parse_from(["pman", "rm", "blink", "pbinstr"]).unwrap();
        assert!(matches!(cli.command, Commands::Remove { .. }));

        let cli = Cli::try_parse_from(["pman", "pplist"]).unwrap();
        assert!(matches!(cli.command, Commands::Projects));
    }
}
