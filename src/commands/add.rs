use super::LoadedManifest;
use crate::manifest::{LinkChange, SubdirectoryPlacement};
use crate::library::normalize_library_name;
use crate::utils::to_cmake_path;
use crate::{PicomanContext, output};
use anyhow::Result;
use tracing::{Level, debug, span};

/// Execute add command - include a library in a project's manifest
///
/// Adds the `add_subdirectory` line for the installed library and links it to
/// `target` (by default the project's executable target). Running it again is
/// a no-op.
///
/// # Errors
///
/// Returns an error if:
/// - The project cannot be resolved
/// - The manifest is missing, unreadable or not UTF-8
/// - Writing the manifest fails
pub fn execute(
    ctx: &PicomanContext,
    project: &str,
    library: &str,
    target: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let library = normalize_library_name(library);
    let span = span!(Level::DEBUG, "add", project, library);
    let _guard = span.enter();

    let manifest = LoadedManifest::open(ctx, project)?;
    let target = manifest.target(target);

    let store = ctx.library_store();
    if !store.is_installed(library) {
        output::warning(&format!(
            "Library '{library}' is not installed in {} (run 'pman install {library}')",
            store.root().display()
        ));
    }
    let library_path = to_cmake_path(&store.library_dir(library));
    debug!(%library_path, target_name = %target, "Resolved library");

    let edited = ctx
        .editor()
        .add_library(&manifest.text, library, &library_path, &target);

    if !edited.changed {
        output::info(&format!(
            "'{library}' is already included and linked in {}",
            manifest.path.display()
        ));
        return Ok(());
    }

    manifest.store(&edited.text, dry_run)?;

    match edited.outcome.subdirectory {
        SubdirectoryPlacement::AfterExecutable => {
            output::action("Included", &library_path);
        }
        SubdirectoryPlacement::AppendedAtEnd => {
            output::action("Included", &library_path);
            output::verbose("No add_executable found, add_subdirectory appended at end of file");
        }
        SubdirectoryPlacement::AlreadyPresent => {
            output::verbose(&format!("{library_path} was already included"));
        }
    }

    match &edited.outcome.link {
        LinkChange::Appended { target } => {
            output::success(&format!("Linked '{library}' to {target}"));
        }
        LinkChange::Synthesized { target } => {
            output::success(&format!(
                "Linked '{library}' to {target} in a new target_link_libraries block"
            ));
        }
        LinkChange::AlreadyLinked { target } => {
            output::info(&format!("'{library}' was already linked to {target}"));
        }
    }

    Ok(())
}
