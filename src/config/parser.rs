use super::{Config, INDENT_RANGE};
use anyhow::{Context, Result};
use std::path::Path;

/// Read and validate a configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not UTF-8, is not valid
/// TOML or holds invalid values
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let content = simdutf8::basic::from_utf8(&bytes)
        .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in config file: {e}"))?;

    parse_config_str(content)
}

/// Parse and validate configuration text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or holds invalid values
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    // Validation errors are returned directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    validate_indent(config.manifest.indent)?;
    validate_file_name(&config.manifest.file_name)?;

    if config.manifest.binary_dir.trim().is_empty() {
        anyhow::bail!("Binary directory cannot be empty");
    }

    if let Some((name, _)) = config.libraries.iter().find(|(_, url)| url.trim().is_empty()) {
        anyhow::bail!("Library '{name}' has an empty repository URL");
    }

    Ok(())
}

/// Check the continuation indent of rewritten link blocks
///
/// # Errors
///
/// Returns an error if `indent` is outside 1..=16
pub fn validate_indent(indent: usize) -> Result<()> {
    if !INDENT_RANGE.contains(&indent) {
        anyhow::bail!(
            "Indent must be between {} and {}",
            INDENT_RANGE.start(),
            INDENT_RANGE.end()
        );
    }
    Ok(())
}

/// Check the manifest file name is a bare file name
///
/// # Errors
///
/// Returns an error if the name is empty or contains a path separator
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Manifest file name cannot be empty");
    }
    if name.contains(['/', '\\']) {
        anyhow::bail!("Manifest file name must not contain path separators: {name}");
    }
    Ok(())
}
