//! CMake manifest editing.
//!
//! The manifest (`CMakeLists.txt`) is treated as structured text rather than
//! parsed with a grammar. Two directive shapes matter:
//!
//! - `add_executable(<target> ...)`, after which library subdirectories are
//!   included
//! - `target_link_libraries(<target> <libs...>)`, the link block
//!
//! [`editor`] holds the pure text transformations, [`scanner`] the
//! balanced-delimiter scanning they are built on and [`file`] the
//! read/atomic-write around them.

/// Manifest editing operations (add/remove library).
pub mod editor;
/// Manifest error taxonomy.
pub mod errors;
/// Reading and atomically replacing manifest files.
pub mod file;
/// Command invocation scanning and argument tokenizing.
pub mod scanner;

pub use editor::{
    AddOutcome, Edited, LinkChange, ManifestEditor, PROJECT_PLACEHOLDER, RemoveOutcome,
    SubdirectoryPlacement, add_library, executable_target, linked_libraries, remove_library,
};
pub use errors::ManifestError;
pub use file::{read_manifest, write_manifest};

/// Conventional manifest file name recognized by CMake.
pub const DEFAULT_MANIFEST_NAME: &str = "CMakeLists.txt";
