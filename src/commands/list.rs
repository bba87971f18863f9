use crate::{PicomanContext, output};
use anyhow::Result;
use colored::Colorize;

/// Execute list command - print installed libraries
///
/// Names go to stdout, one per line. Registered libraries that are not
/// installed are listed in verbose mode.
///
/// # Errors
///
/// Returns an error if the library root cannot be read
pub fn execute(ctx: &PicomanContext) -> Result<()> {
    let store = ctx.library_store();
    let installed = store.installed()?;

    if installed.is_empty() {
        output::info(&format!("No libraries installed in {}", store.root().display()));
    }

    for name in &installed {
        match ctx.config.library_url(name) {
            Some(url) if output::get_verbosity() == output::Verbosity::Verbose => {
                println!("{name} {}", url.dimmed());
            }
            _ => println!("{name}"),
        }
    }

    for name in ctx.config.libraries.keys() {
        if !installed.contains(name) {
            output::verbose(&format!("{name} (registered, not installed)"));
        }
    }

    Ok(())
}
