use crate::{PicomanContext, library, output};
use anyhow::Result;

/// Execute projects command - print projects under the project root
///
/// A project is a directory holding the configured manifest file.
///
/// # Errors
///
/// Returns an error if the project root cannot be read
pub fn execute(ctx: &PicomanContext) -> Result<()> {
    let projects = library::projects(&ctx.project_root, &ctx.config.manifest.file_name)?;

    if projects.is_empty() {
        output::info(&format!("No projects found in {}", ctx.project_root.display()));
        return Ok(());
    }

    for project in projects {
        println!("{project}");
    }
    Ok(())
}
