use super::LoadedManifest;
use crate::library::normalize_library_name;
use crate::utils::pluralize;
use crate::{PicomanContext, output};
use anyhow::Result;
use tracing::{Level, span};

/// Execute remove command - drop a library from a project's manifest
///
/// Removes the library's `add_subdirectory` lines and its entries in the link
/// blocks of `target`. A library the manifest does not mention is reported,
/// not treated as an error. The installed library itself is left alone.
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
    let span = span!(Level::DEBUG, "remove", project, library);
    let _guard = span.enter();

    let manifest = LoadedManifest::open(ctx, project)?;
    let target = manifest.target(target);

    let edited = ctx.editor().remove_library(&manifest.text, library, &target);
    let outcome = edited.outcome;

    if !outcome.found() {
        output::warning(&format!(
            "'{library}' is not referenced in {}",
            manifest.path.display()
        ));
        return Ok(());
    }

    if edited.changed {
        manifest.store(&edited.text, dry_run)?;
    }

    if outcome.subdirectory_lines > 0 {
        output::action(
            "Removed",
            &pluralize(outcome.subdirectory_lines, "add_subdirectory line", "add_subdirectory lines"),
        );
    }
    if outcome.link_entries > 0 {
        output::action(
            "Unlinked",
            &format!(
                "{} from {target}",
                pluralize(outcome.link_entries, "entry", "entries")
            ),
        );
    }
    if outcome.blocks_dropped > 0 {
        output::verbose(&format!(
            "Dropped {} left without libraries",
            pluralize(outcome.blocks_dropped, "link block", "link blocks")
        ));
    }
    output::success(&format!("Removed '{library}' from {}", manifest.path.display()));

    Ok(())
}
