use anyhow::Result;
use colored::Colorize;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::io::Write;
use std::path::Path;
use tracing::{Level, debug, span};

/// Configuration for unified diff generation
#[derive(Debug, Clone, Copy)]
pub struct UnifiedDiffConfig {
    /// Number of context lines around changes (typically 3)
    pub context_lines: usize,
    /// Diff algorithm to use (Myers, Patience, Histogram)
    pub algorithm: Algorithm,
    /// Whether to colorize the output
    pub colorize: bool,
}

impl Default for UnifiedDiffConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            algorithm: Algorithm::Myers,
            colorize: false,
        }
    }
}

/// Generate a unified diff between the current and edited manifest.
///
/// Git-style output: `--- a/path` / `+++ b/path` headers, `@@` hunk headers,
/// then context, `-` deletion and `+` addition lines. Returns the number of
/// changed lines written.
///
/// # Errors
///
/// Returns an error if writing to the output writer fails.
pub fn generate_unified_diff(
    old_content: &str,
    new_content: &str,
    path: &Path,
    config: &UnifiedDiffConfig,
    writer: &mut dyn Write,
) -> Result<usize> {
    let span = span!(
        Level::DEBUG,
        "manifest_diff",
        path = %path.display(),
        algorithm = ?config.algorithm,
        context = config.context_lines
    );
    let _guard = span.enter();

    // Create diff with specified algorithm
    let diff = TextDiff::configure()
        .algorithm(config.algorithm)
        .diff_lines(old_content, new_content);

    let old_header = format!("--- a/{}", path.display());
    let new_header = format!("+++ b/{}", path.display());

    if config.colorize {
        writeln!(writer, "{}", old_header.red())?;
        writeln!(writer, "{}", new_header.green())?;
    } else {
        writeln!(writer, "{old_header}")?;
        writeln!(writer, "{new_header}")?;
    }

    let mut total_changes = 0;

    // Generate hunks with context
    for hunk in diff
        .unified_diff()
        .context_radius(config.context_lines)
        .iter_hunks()
    {
        // Hunk header (e.g., "@@ -10,7 +10,9 @@")
        let hunk_header = hunk.header().to_string();

        if config.colorize {
            writeln!(writer, "{}", hunk_header.cyan())?;
        } else {
            writeln!(writer, "{hunk_header}")?;
        }

        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => {
                    total_changes += 1;
                    let line = format!("-{change}");
                    if config.colorize { line.red().to_string() } else { line }
                }
                ChangeTag::Insert => {
                    total_changes += 1;
                    let line = format!("+{change}");
                    if config.colorize { line.green().to_string() } else { line }
                }
                ChangeTag::Equal => format!(" {change}"),
            };

            write!(writer, "{line}")?;

            // The last line of a file may lack its newline
            if change.missing_newline() {
                writeln!(writer)?;
            }
        }
    }

    debug!(changes = total_changes, "Diff generation complete");

    Ok(total_changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(old: &str, new: &str) -> Result<(String, usize)> {
        let mut output = Vec::new();
        let changes = generate_unified_diff(
            old,
            new,
            Path::new("blink/CMakeLists.txt"),
            &UnifiedDiffConfig::default(),
            &mut output,
        )?;
        Ok((String::from_utf8(output)?, changes))
    }

    #[test]
    fn test_unified_diff_added_library() -> Result<()> {
        let old = "add_executable(blink main.c)\ntarget_link_libraries(blink\n    pico_stdlib\n)\n";
        let new = "add_executable(blink main.c)\ntarget_link_libraries(blink\n    pico_stdlib\n    pbinstr\n)\n";

        let (result, changes) = render(old, new)?;

        assert!(result.contains("--- a/blink/CMakeLists.txt"));
        assert!(result.contains("+++ b/blink/CMakeLists.txt"));
        assert!(result.contains("@@"));
        assert!(result.contains("+    pbinstr\n"));
        assert_eq!(changes, 1);
        Ok(())
    }

    #[test]
    fn test_unified_diff_no_changes() -> Result<()> {
        let content = "project(blink)\n";

        let (result, changes) = render(content, content)?;

        // Headers only, no hunks
        assert!(result.contains("--- a/blink/CMakeLists.txt"));
        assert!(!result.contains("@@"));
        assert_eq!(changes, 0);
        Ok(())
    }

    #[test]
    fn test_unified_diff_missing_final_newline() -> Result<()> {
        let (result, changes) = render("project(a)", "project(b)")?;

        assert!(result.contains("-project(a)\n"));
        assert!(result.ends_with("+project(b)\n"));
        assert_eq!(changes, 2);
        Ok(())
    }
}
