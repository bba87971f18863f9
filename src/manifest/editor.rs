//! Adding and removing library dependencies in a CMake manifest.
//!
//! Both operations are pure: they take the manifest text and return new text
//! plus an outcome. Persisting the result is left to [`super::file`].

use super::scanner::{self, Command, Token};
use std::collections::HashSet;
use tracing::{Level, debug, span, warn};

/// Command that registers the project's executable.
pub const EXECUTABLE_COMMAND: &str = "add_executable";

/// Command that pulls a library's source tree into the build.
pub const SUBDIRECTORY_COMMAND: &str = "add_subdirectory";

/// Command that links libraries into a target.
pub const LINK_COMMAND: &str = "target_link_libraries";

/// Target placeholder that always names the current project.
pub const PROJECT_PLACEHOLDER: &str = "${PROJECT_NAME}";

/// Default build output root for library subdirectories.
pub const DEFAULT_BINARY_DIR: &str = "${CMAKE_BINARY_DIR}";

/// Default indentation width of rewritten link blocks.
pub const DEFAULT_INDENT: usize = 4;

const VISIBILITY_KEYWORDS: [&str; 3] = ["PRIVATE", "PUBLIC", "INTERFACE"];

/// Result of an edit: the new manifest text and what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edited<O> {
    /// Full manifest text after the edit.
    pub text: String,
    /// Operation specific outcome.
    pub outcome: O,
    /// Whether `text` differs from the input.
    pub changed: bool,
}

/// Where the `add_subdirectory` line ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdirectoryPlacement {
    /// Inserted right after the `add_executable` directive.
    AfterExecutable,
    /// No executable directive exists; appended at end of file.
    AppendedAtEnd,
    /// The manifest already includes the library path.
    AlreadyPresent,
}

/// What happened to the link block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkChange {
    /// The library was appended to an existing block for `target`.
    Appended {
        /// Target named by the block that was edited.
        target: String,
    },
    /// The block for `target` already linked the library.
    AlreadyLinked {
        /// Target named by the block that was inspected.
        target: String,
    },
    /// No link block existed; a new one was appended.
    Synthesized {
        /// Target of the new block.
        target: String,
    },
}

/// Outcome of [`ManifestEditor::add_library`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// What happened to the `add_subdirectory` line.
    pub subdirectory: SubdirectoryPlacement,
    /// What happened to the link block.
    pub link: LinkChange,
}

impl AddOutcome {
    /// True when the manifest already had everything the add asked for.
    #[must_use]
    pub const fn already_satisfied(&self) -> bool {
        matches!(self.subdirectory, SubdirectoryPlacement::AlreadyPresent)
            && matches!(self.link, LinkChange::AlreadyLinked { .. })
    }
}

/// Outcome of [`ManifestEditor::remove_library`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// `add_subdirectory` lines dropped.
    pub subdirectory_lines: usize,
    /// Library entries removed from link blocks.
    pub link_entries: usize,
    /// Link blocks dropped because nothing was left in them.
    pub blocks_dropped: usize,
}

impl RemoveOutcome {
    /// Whether anything was removed at all.
    #[must_use]
    pub const fn found(&self) -> bool {
        self.subdirectory_lines > 0 || self.link_entries > 0
    }
}

/// Rewrites `add_subdirectory` / `target_link_libraries` directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEditor {
    /// Spaces per nesting level inside rewritten link blocks.
    pub indent: usize,
    /// Build output root used for library subdirectories.
    pub binary_dir: String,
}

impl Default for ManifestEditor {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            binary_dir: DEFAULT_BINARY_DIR.to_string(),
        }
    }
}

/// One entry of a link block after the target.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    /// `PRIVATE`, `PUBLIC` or `INTERFACE`, as written.
    Keyword(String),
    /// A library, by unquoted name and as written.
    Library { name: String, raw: String },
    /// Anything that must survive untouched (nested calls, groups).
    Verbatim(String),
}

impl Entry {
    fn raw(&self) -> &str {
        match self {
            Self::Keyword(raw) | Self::Library { raw, .. } | Self::Verbatim(raw) => raw,
        }
    }

    fn is_library(&self, library: &str) -> bool {
        matches!(self, Self::Library { name, .. } if name == library)
    }
}

/// Line processing state while removing a library.
enum LineState {
    Normal,
    /// Inside a link block that has not been closed yet.
    Buffering(String),
}

impl ManifestEditor {
    /// Creates an editor with the given indentation and build output root.
    #[must_use]
    pub fn new(indent: usize, binary_dir: impl Into<String>) -> Self {
        Self {
            indent,
            binary_dir: binary_dir.into(),
        }
    }

    /// The inclusion line written for a library.
    #[must_use]
    pub fn subdirectory_line(&self, library: &str, library_path: &str) -> String {
        format!(
            "{SUBDIRECTORY_COMMAND}(\"{library_path}\" \"{}/{library}_build\")",
            self.binary_dir
        )
    }

    /// Adds `library` to the manifest: an `add_subdirectory` line for
    /// `library_path` and an entry in the link block of `target`.
    ///
    /// Applying the same add twice leaves the text of the first application
    /// unchanged.
    #[must_use]
    pub fn add_library(
        &self,
        text: &str,
        library: &str,
        library_path: &str,
        target: &str,
    ) -> Edited<AddOutcome> {
        let span = span!(Level::DEBUG, "add_library", library, target_name = target);
        let _guard = span.enter();

        let (included, subdirectory) = self.include_subdirectory(text, library, library_path);
        let (linked, link) = self.link_library(&included, library, target);

        debug!(?subdirectory, ?link, "Library added");

        let changed = linked != text;
        Edited {
            text: linked,
            outcome: AddOutcome { subdirectory, link },
            changed,
        }
    }

    /// Removes `library` from the manifest: drops its `add_subdirectory` lines
    /// and its entries in the link blocks associated with `target`.
    ///
    /// Works line by line so that a malformed block elsewhere in the file
    /// cannot derail it.
    #[must_use]
    pub fn remove_library(&self, text: &str, library: &str, target: &str) -> Edited<RemoveOutcome> {
        let span = span!(Level::DEBUG, "remove_library", library, target_name = target);
        let _guard = span.enter();

        if library.trim().is_empty() {
            return Edited {
                text: text.to_string(),
                outcome: RemoveOutcome::default(),
                changed: false,
            };
        }

        let mut removal = Removal {
            library,
            associated: associated_targets(text, target),
            out: String::with_capacity(text.len()),
            outcome: RemoveOutcome::default(),
        };
        let mut state = LineState::Normal;

        for line in text.split_inclusive('\n') {
            state = match state {
                LineState::Normal if is_subdirectory_line(line, library) => {
                    debug!(line = line.trim_end(), "Dropping subdirectory line");
                    removal.outcome.subdirectory_lines += 1;
                    LineState::Normal
                }
                LineState::Normal => removal.feed(line),
                LineState::Buffering(mut buffer) => {
                    buffer.push_str(line);
                    removal.take_block(buffer)
                }
            };
        }

        if let LineState::Buffering(buffer) = state {
            warn!("Unterminated {LINK_COMMAND} block, leaving it untouched");
            removal.out.push_str(&buffer);
        }

        let Removal { out, outcome, .. } = removal;
        debug!(?outcome, "Library removal finished");

        let changed = out != text;
        Edited {
            text: out,
            outcome,
            changed,
        }
    }

    fn include_subdirectory(
        &self,
        text: &str,
        library: &str,
        library_path: &str,
    ) -> (String, SubdirectoryPlacement) {
        let line = self.subdirectory_line(library, library_path);
        let commands = scanner::commands(text);

        let present = text.contains(&line)
            || commands
                .iter()
                .filter(|command| command.is(SUBDIRECTORY_COMMAND))
                .any(|command| command.first_argument() == Some(library_path));
        if present {
            return (text.to_string(), SubdirectoryPlacement::AlreadyPresent);
        }

        let eol = newline(text);
        let Some(executable) = commands.iter().find(|c| c.is(EXECUTABLE_COMMAND)) else {
            return (append_line(text, &line), SubdirectoryPlacement::AppendedAtEnd);
        };

        // After the whole line holding the closing paren, so trailing comments stay put.
        let at = text[executable.end()..]
            .find('\n')
            .map_or(text.len(), |pos| executable.end() + pos + 1);

        let mut out = String::with_capacity(text.len() + line.len() + 8);
        out.push_str(&text[..at]);
        if !out.ends_with('\n') {
            out.push_str(eol);
        }
        out.push_str(line_indent(text, executable.start));
        out.push_str(&line);
        out.push_str(eol);
        out.push_str(&text[at..]);

        (out, SubdirectoryPlacement::AfterExecutable)
    }

    fn link_library(&self, text: &str, library: &str, target: &str) -> (String, LinkChange) {
        let commands = scanner::commands(text);
        let eol = newline(text);

        let Some(block) = choose_block(&commands, target) else {
            let entries = [Entry::Library {
                name: library.to_string(),
                raw: library.to_string(),
            }];
            let rendered = self.render_block(LINK_COMMAND, target, &entries, "", eol);
            return (
                append_line(text, &rendered),
                LinkChange::Synthesized {
                    target: target.to_string(),
                },
            );
        };

        let tokens = block.tokens();
        let mut arguments = tokens.iter().filter(|token| !token.is_comment());
        let block_target = arguments.next().map_or(target, Token::raw);

        let mut entries = dedup_libraries(collect_entries(arguments));
        let already_linked = entries.iter().any(|entry| entry.is_library(library));
        if !already_linked {
            entries.push(Entry::Library {
                name: library.to_string(),
                raw: library.to_string(),
            });
        }
        let entries = prune_keywords(entries);

        let indent = line_indent(text, block.start);
        let rendered = self.render_block(block.name, block_target, &entries, indent, eol);

        let mut out = String::with_capacity(text.len() + rendered.len());
        out.push_str(&text[..block.start]);
        out.push_str(&rendered);
        out.push_str(&text[block.end()..]);

        let target = block_target.to_string();
        let change = if already_linked {
            LinkChange::AlreadyLinked { target }
        } else {
            LinkChange::Appended { target }
        };
        (out, change)
    }

    fn render_block(
        &self,
        name: &str,
        target: &str,
        entries: &[Entry],
        indent: &str,
        eol: &str,
    ) -> String {
        let inner = format!("{indent}{}", " ".repeat(self.indent));
        let mut block = format!("{name}({target}{eol}");
        for entry in entries {
            block.push_str(&inner);
            block.push_str(entry.raw());
            block.push_str(eol);
        }
        block.push_str(indent);
        block.push(')');
        block
    }
}

/// Adds `library` with the default editor settings.
#[must_use]
pub fn add_library(text: &str, library: &str, library_path: &str, target: &str) -> Edited<AddOutcome> {
    ManifestEditor::default().add_library(text, library, library_path, target)
}

/// Removes `library` with the default editor settings.
#[must_use]
pub fn remove_library(text: &str, library: &str, target: &str) -> Edited<RemoveOutcome> {
    ManifestEditor::default().remove_library(text, library, target)
}

/// Target of the first `add_executable` directive, if any.
#[must_use]
pub fn executable_target(text: &str) -> Option<String> {
    scanner::commands(text)
        .iter()
        .find(|command| command.is(EXECUTABLE_COMMAND))
        .and_then(Command::first_argument)
        .map(str::to_string)
}

/// Libraries linked by the block an add for `target` would edit.
#[must_use]
pub fn linked_libraries(text: &str, target: &str) -> Vec<String> {
    let commands = scanner::commands(text);
    let Some(block) = choose_block(&commands, target) else {
        return Vec::new();
    };
    let tokens = block.tokens();
    collect_entries(tokens.iter().filter(|token| !token.is_comment()).skip(1))
        .into_iter()
        .filter_map(|entry| match entry {
            Entry::Library { name, .. } => Some(name),
            _ => None,
        })
        .collect()
}

/// Output and counters of a removal in progress.
struct Removal<'r> {
    library: &'r str,
    associated: Vec<String>,
    out: String,
    outcome: RemoveOutcome,
}

impl Removal<'_> {
    /// Copies `rest` of a line, handing a link block that starts in it to
    /// [`Self::take_block`].
    fn feed(&mut self, rest: &str) -> LineState {
        let Some(at) = scanner::find_invocation(rest, LINK_COMMAND) else {
            self.out.push_str(rest);
            return LineState::Normal;
        };
        self.out.push_str(&rest[..at]);
        self.take_block(rest[at..].to_string())
    }

    /// Emits the buffered block once it is complete, otherwise keeps buffering.
    fn take_block(&mut self, buffer: String) -> LineState {
        let complete = scanner::commands(&buffer)
            .first()
            .copied()
            .filter(|command| command.start == 0 && command.is(LINK_COMMAND));
        let Some(block) = complete else {
            return LineState::Buffering(buffer);
        };

        let tail = &buffer[block.end()..];
        if !self.emit_without(&buffer[..block.end()], &block) {
            return self.feed(tail);
        }

        // Dropped block: keep the rest of the line, or the line ending if
        // earlier commands share the line; drop a line left blank.
        let line_start = self.out.rfind('\n').map_or(0, |nl| nl + 1);
        let before = self.out[line_start..].trim_end_matches([' ', '\t']).len();
        let rest = tail.trim_start_matches([' ', '\t']);
        if !rest.trim().is_empty() {
            self.feed(rest)
        } else if before == 0 {
            self.out.truncate(line_start);
            LineState::Normal
        } else {
            self.out.truncate(line_start + before);
            self.out.push_str(rest);
            LineState::Normal
        }
    }

    /// Writes `block` without the library. Returns true when nothing was left
    /// in it and it was dropped instead.
    fn emit_without(&mut self, raw: &str, block: &Command<'_>) -> bool {
        let tokens = block.tokens();
        let mut arguments = tokens.iter().filter(|token| !token.is_comment());
        let Some(block_target) = arguments.next() else {
            self.out.push_str(raw);
            return false;
        };
        if !self.associated.iter().any(|t| t == block_target.value()) {
            self.out.push_str(raw);
            return false;
        }

        let entries = collect_entries(arguments);
        let before = entries.len();
        let entries: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| !entry.is_library(self.library))
            .collect();
        let removed = before - entries.len();
        if removed == 0 {
            self.out.push_str(raw);
            return false;
        }
        self.outcome.link_entries += removed;

        let entries = prune_keywords(entries);
        if entries.iter().all(|entry| matches!(entry, Entry::Keyword(_))) {
            debug!(block = block_target.raw(), "Dropping emptied link block");
            self.outcome.blocks_dropped += 1;
            return true;
        }

        let listed: Vec<&str> = entries.iter().map(Entry::raw).collect();
        self.out.push_str(&format!(
            "{}({} {})",
            block.name,
            block_target.raw(),
            listed.join(" ")
        ));
        false
    }
}

/// Picks the link block for `target`: exact match, then the project
/// placeholder, then the first block.
fn choose_block<'c, 'a>(commands: &'c [Command<'a>], target: &str) -> Option<&'c Command<'a>> {
    let blocks: Vec<&Command<'a>> = commands.iter().filter(|c| c.is(LINK_COMMAND)).collect();
    blocks
        .iter()
        .find(|block| block.first_argument() == Some(target))
        .or_else(|| {
            blocks
                .iter()
                .find(|block| block.first_argument() == Some(PROJECT_PLACEHOLDER))
        })
        .or_else(|| blocks.first())
        .copied()
}

/// Targets whose link blocks a removal for `target` may touch.
fn associated_targets(text: &str, target: &str) -> Vec<String> {
    let targets: Vec<String> = scanner::commands(text)
        .iter()
        .filter(|command| command.is(LINK_COMMAND))
        .filter_map(Command::first_argument)
        .map(str::to_string)
        .collect();

    if targets.iter().any(|t| t == target || t == PROJECT_PLACEHOLDER) {
        vec![target.to_string(), PROJECT_PLACEHOLDER.to_string()]
    } else {
        targets.into_iter().take(1).collect()
    }
}

fn collect_entries<'t, 'a: 't>(tokens: impl Iterator<Item = &'t Token<'a>>) -> Vec<Entry> {
    tokens
        .filter_map(|token| match token {
            Token::Comment(_) => None,
            Token::Nested(raw) => Some(Entry::Verbatim((*raw).to_string())),
            Token::Unquoted(raw) if is_visibility_keyword(raw) => {
                Some(Entry::Keyword((*raw).to_string()))
            }
            other => {
                let name = other.value().trim();
                (!name.is_empty()).then(|| Entry::Library {
                    name: name.to_string(),
                    raw: other.raw().to_string(),
                })
            }
        })
        .collect()
}

fn dedup_libraries(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| match entry {
            Entry::Library { name, .. } => seen.insert(name.clone()),
            _ => true,
        })
        .collect()
}

/// Drops visibility keywords that no longer have any entry after them.
fn prune_keywords(entries: Vec<Entry>) -> Vec<Entry> {
    let mut kept = Vec::with_capacity(entries.len());
    let mut has_items_after = false;
    for entry in entries.into_iter().rev() {
        if matches!(entry, Entry::Keyword(_)) {
            if has_items_after {
                kept.push(entry);
            }
            has_items_after = false;
        } else {
            has_items_after = true;
            kept.push(entry);
        }
    }
    kept.reverse();
    kept
}

fn is_visibility_keyword(word: &str) -> bool {
    VISIBILITY_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(word))
}

/// An uncommented `add_subdirectory` line naming `library`, either as a word
/// or through the `<library>_build` output directory add writes.
fn is_subdirectory_line(line: &str, library: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.starts_with('#')
        && trimmed.to_ascii_lowercase().contains(SUBDIRECTORY_COMMAND)
        && (contains_word(line, library) || names_build_dir(line, library))
}

/// `/<library>_build` occurs in `line` as a whole path component.
fn names_build_dir(line: &str, library: &str) -> bool {
    let needle = format!("/{library}_build");
    line.match_indices(&needle).any(|(at, _)| {
        line[at + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-')))
    })
}

/// `word` occurs in `haystack` not glued to other name characters, so that
/// `pico` does not match `pico_extra`.
fn contains_word(haystack: &str, word: &str) -> bool {
    let is_name_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-');
    haystack.match_indices(word).any(|(at, _)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + word.len()..].chars().next();
        !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
    })
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(text: &str, pos: usize) -> &str {
    let start = text[..pos].rfind('\n').map_or(0, |nl| nl + 1);
    let line = &text[start..pos];
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

fn newline(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

fn append_line(text: &str, line: &str) -> String {
    let eol = newline(text);
    let mut out = String::with_capacity(text.len() + line.len() + 2);
    out.push_str(text);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(eol);
    }
    out.push_str(line);
    out.push_str(eol);
    out
}
