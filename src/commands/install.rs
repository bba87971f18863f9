use crate::library::{InstallAction, normalize_library_name};
use crate::{PicomanContext, output};
use anyhow::Result;

/// Execute install command - clone or update a library
///
/// The repository URL comes from `--url` or the `[libraries]` registry. A
/// URL given on the command line is recorded in the registry once the
/// install succeeds.
///
/// # Errors
///
/// Returns an error if:
/// - No URL is known for the library
/// - git is missing or the clone/pull fails
/// - The configuration cannot be saved
pub fn execute(ctx: &mut PicomanContext, library: &str, url: Option<&str>) -> Result<()> {
    let library = normalize_library_name(library);
    if library.is_empty() || library.contains(['/', '\\']) {
        anyhow::bail!("Invalid library name: '{library}'");
    }

    let url = match url {
        Some(url) => url.to_string(),
        None => ctx
            .config
            .library_url(library)
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Library '{library}' is not in the registry. Pass --url or register it with \
                     'pman config libraries.{library} <url>'"
                )
            })?,
    };

    output::verbose(&format!("Fetching {library} from {url}"));
    let store = ctx.library_store();
    let action = store.install(library, &url)?;
    let dir = store.library_dir(library);

    if ctx.config.library_url(library) != Some(url.as_str()) {
        ctx.config.set_library(library.to_string(), url.clone());
        ctx.config.save(&ctx.config_path)?;
        output::verbose(&format!("Registered {library} = {url}"));
    }

    match action {
        InstallAction::Cloned => {
            output::success(&format!("Installed '{library}' into {}", dir.display()));
        }
        InstallAction::Updated => {
            output::success(&format!("Updated '{library}' in {}", dir.display()));
        }
    }

    Ok(())
}
