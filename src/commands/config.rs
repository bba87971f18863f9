use crate::PicomanContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - Failed to set or unset configuration value
/// - Failed to save configuration
pub fn execute(
    ctx: &mut PicomanContext,
    key: Option<&str>,
    value: Option<String>,
    unset: bool,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    let Some(key) = key.filter(|_| !list) else {
        show_all_config(ctx);
        return Ok(());
    };

    if unset {
        ctx.config.unset(key)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Unset {key}"));
    } else if let Some(val) = value {
        ctx.config.set(key, val.clone())?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        output::warning(&format!("Configuration key '{key}' is not set"));
    }

    Ok(())
}

/// Show all configuration values
fn show_all_config(ctx: &PicomanContext) {
    println!("{}", "[paths]".bold());
    println!("  lib_path = {}", ctx.config.paths.lib_path.display());
    println!(
        "  projects_path = {}",
        ctx.config.paths.projects_path.display()
    );

    println!("\n{}", "[manifest]".bold());
    println!("  file_name = {}", ctx.config.manifest.file_name);
    println!("  binary_dir = {}", ctx.config.manifest.binary_dir);
    println!("  indent = {}", ctx.config.manifest.indent);

    if !ctx.config.libraries.is_empty() {
        println!("\n{}", "[libraries]".bold());
        for (name, url) in &ctx.config.libraries {
            println!("  {name} = {url}");
        }
    }

    output::verbose(&format!(
        "Resolved roots: libraries {}, projects {}",
        ctx.lib_root.display(),
        ctx.project_root.display()
    ));
}
