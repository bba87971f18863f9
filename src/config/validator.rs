use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Recognizes configuration fields so stale or mistyped ones can be reported
pub struct ConfigValidator {
    /// Set of valid configuration fields that are recognized by picoman
    known_fields: HashSet<&'static str>,
    /// Set of deprecated configuration fields that should trigger warnings
    deprecated_fields: HashSet<&'static str>,
}

/// Report of a configuration file check
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Fields picoman does not know
    pub unknown: Vec<String>,
    /// Fields that still work but have a replacement
    pub deprecated: Vec<String>,
}

impl ValidationReport {
    /// Whether nothing needs reporting
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.deprecated.is_empty()
    }
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = HashSet::from([
            "paths.lib_path",
            "paths.projects_path",
            "manifest.file_name",
            "manifest.binary_dir",
            "manifest.indent",
        ]);
        let deprecated_fields = HashSet::from(["paths.pico_projects_path"]);

        Self {
            known_fields,
            deprecated_fields,
        }
    }

    /// Check configuration text for unknown and deprecated fields
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML
    pub fn check_str(&self, content: &str) -> Result<ValidationReport> {
        let parsed: toml::Value = toml::from_str(content)?;
        let mut report = ValidationReport::default();
        self.check_table(&parsed, "", &mut report);
        Ok(report)
    }

    /// Validate a configuration file and warn about issues
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let report = self.check_str(&content)?;
        if report.is_clean() {
            return Ok(());
        }

        let mut warnings = Vec::new();
        for field in &report.unknown {
            warnings.push(format!("Unknown configuration field: {}", field.yellow()));
        }

        for field in &report.deprecated {
            let suggestion = match field.as_str() {
                "paths.pico_projects_path" => "Renamed to 'paths.projects_path'.",
                _ => "This field is deprecated and will be removed in a future version.",
            };
            warnings.push(format!(
                "Deprecated field '{}': {}",
                field.yellow(),
                suggestion.dimmed()
            ));
        }

        eprintln!("{}", "Configuration warnings:".yellow().bold());
        for warning in warnings {
            eprintln!("  {warning}");
        }
        eprintln!();

        Ok(())
    }

    /// Recursively checks a TOML table for unknown and deprecated fields
    ///
    /// Entries under `libraries` are user-chosen names and must be plain
    /// strings.
    fn check_table(&self, table: &toml::Value, prefix: &str, report: &mut ValidationReport) {
        let toml::Value::Table(map) = table else {
            return;
        };

        for (key, value) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if prefix == "libraries" {
                if !value.is_str() {
                    report.unknown.push(full_key);
                }
                continue;
            }

            if self.deprecated_fields.contains(full_key.as_str()) {
                report.deprecated.push(full_key);
                continue;
            }

            match value {
                toml::Value::Table(_) => self.check_table(value, &full_key, report),
                _ if self.known_fields.contains(full_key.as_str()) => {}
                _ => report.unknown.push(full_key),
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
