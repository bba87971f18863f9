//! Diff generation for manifest previews.
//!
//! `--dry-run` renders the edit as a unified diff instead of writing it.

/// Unified diff generation for text files
pub mod unified;

pub use unified::{UnifiedDiffConfig, generate_unified_diff};
