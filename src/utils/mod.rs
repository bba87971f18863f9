//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`paths`]: Path manipulation (tilde expansion, root resolution, CMake
//!   path rendering)

/// Path manipulation and resolution utilities
pub mod paths;

pub use paths::{expand_tilde, make_absolute, to_cmake_path};

/// `"1 entry"` / `"2 entries"` style counts for user messages.
#[must_use]
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "entry", "entries"), "1 entry");
        assert_eq!(pluralize(0, "entry", "entries"), "0 entries");
        assert_eq!(pluralize(3, "line", "lines"), "3 lines");
    }
}
