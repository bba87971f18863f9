//! Balanced-delimiter scanning of CMake command invocations.
//!
//! This is deliberately not a CMake parser. It only knows enough of the
//! syntax to find `name( ... )` invocations and split their argument lists:
//!
//! - line comments (`# ...`) and bracket comments (`#[[ ... ]]`)
//! - quoted arguments with backslash escapes
//! - bracket arguments (`[[ ... ]]`, `[=[ ... ]=]`)
//! - nested parentheses
//!
//! Everything else is opaque text. Unterminated constructs never panic, they
//! simply stop being recognized.

/// A command invocation located in manifest text.
///
/// All offsets are byte offsets into the text the command was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    /// Command name as written (case preserved).
    pub name: &'a str,
    /// Offset of the first byte of the name.
    pub start: usize,
    /// Offset of the opening parenthesis.
    pub open: usize,
    /// Offset of the matching closing parenthesis.
    pub close: usize,
    source: &'a str,
}

impl<'a> Command<'a> {
    /// Offset one past the closing parenthesis.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.close + 1
    }

    /// Raw text between the parentheses.
    #[must_use]
    pub fn args(&self) -> &'a str {
        &self.source[self.open + 1..self.close]
    }

    /// Whether this invocation is of `name` (CMake command names ignore case).
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Tokenized argument list.
    #[must_use]
    pub fn tokens(&self) -> Vec<Token<'a>> {
        tokenize(self.args())
    }

    /// Value of the first non-comment argument, usually the target name.
    #[must_use]
    pub fn first_argument(&self) -> Option<&'a str> {
        self.tokens()
            .into_iter()
            .find(|token| !token.is_comment())
            .map(|token| token.value())
    }
}

/// One entry of a command's argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Plain argument, `${VAR}` and `$<...>` included.
    Unquoted(&'a str),
    /// `"..."` argument, raw text including the quotes.
    Quoted(&'a str),
    /// `[[...]]` argument, raw text including the brackets.
    Bracket(&'a str),
    /// Line or bracket comment, raw text including the `#`.
    Comment(&'a str),
    /// Call-like construct (`name(...)` or a bare `(...)` group), raw text.
    Nested(&'a str),
}

impl<'a> Token<'a> {
    /// Source text of the token exactly as written.
    #[must_use]
    pub const fn raw(&self) -> &'a str {
        match self {
            Self::Unquoted(raw)
            | Self::Quoted(raw)
            | Self::Bracket(raw)
            | Self::Comment(raw)
            | Self::Nested(raw) => raw,
        }
    }

    /// Argument value with quoting removed. Escapes are not processed.
    #[must_use]
    pub fn value(&self) -> &'a str {
        match self {
            Self::Quoted(raw) => {
                let inner = raw.strip_prefix('"').unwrap_or(raw);
                inner.strip_suffix('"').unwrap_or(inner)
            }
            Self::Bracket(raw) => {
                let eq = bracket_open_len(raw.as_bytes(), 0).unwrap_or(0);
                let open = eq + 2;
                let close = raw.len().saturating_sub(eq + 2);
                if open <= close { &raw[open..close] } else { raw }
            }
            _ => self.raw(),
        }
    }

    /// Whether this token is a comment.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }
}

/// Finds every top-level command invocation in `text`, in source order.
///
/// Invocations nested inside another invocation's arguments are not reported
/// separately. An invocation without a matching `)` is skipped and scanning
/// resumes right after its name.
#[must_use]
pub fn commands(text: &str) -> Vec<Command<'_>> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'#' => i = skip_comment(bytes, i),
            b'"' => i = skip_quoted(bytes, i),
            b'[' if bracket_open_len(bytes, i).is_some() => i = skip_bracket(bytes, i),
            b if is_ident_start(b) && (i == 0 || !is_ident_char(bytes[i - 1])) => {
                let name_end = ident_end(bytes, i);
                let open = skip_blanks(bytes, name_end);
                if bytes.get(open) == Some(&b'(')
                    && let Some(close) = matching_paren(bytes, open)
                {
                    found.push(Command {
                        name: &text[i..name_end],
                        start: i,
                        open,
                        close,
                        source: text,
                    });
                    i = close + 1;
                } else {
                    i = name_end;
                }
            }
            _ => i += 1,
        }
    }

    found
}

/// Offset of the first invocation of `name` in `text`, whether or not its
/// `)` is in `text` too.
///
/// Comments, quoted and bracket arguments and the arguments of other closed
/// invocations are skipped.
#[must_use]
pub fn find_invocation(text: &str, name: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'#' => i = skip_comment(bytes, i),
            b'"' => i = skip_quoted(bytes, i),
            b'[' if bracket_open_len(bytes, i).is_some() => i = skip_bracket(bytes, i),
            b if is_ident_start(b) && (i == 0 || !is_ident_char(bytes[i - 1])) => {
                let name_end = ident_end(bytes, i);
                let open = skip_blanks(bytes, name_end);
                if bytes.get(open) != Some(&b'(') {
                    i = name_end;
                } else if text[i..name_end].eq_ignore_ascii_case(name) {
                    return Some(i);
                } else {
                    i = matching_paren(bytes, open).map_or(name_end, |close| close + 1);
                }
            }
            _ => i += 1,
        }
    }

    None
}

/// Splits a raw argument list into tokens.
#[must_use]
pub fn tokenize(args: &str) -> Vec<Token<'_>> {
    let bytes = args.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b if b.is_ascii_whitespace() => {
                i += 1;
            }
            b'#' => {
                i = skip_comment(bytes, i);
                tokens.push(Token::Comment(args[start..i].trim_end()));
            }
            b'"' => {
                i = skip_quoted(bytes, i);
                tokens.push(Token::Quoted(&args[start..i]));
            }
            b'[' if bracket_open_len(bytes, i).is_some() => {
                i = skip_bracket(bytes, i);
                tokens.push(Token::Bracket(&args[start..i]));
            }
            b'(' => {
                i = matching_paren(bytes, i).map_or(bytes.len(), |close| close + 1);
                tokens.push(Token::Nested(&args[start..i]));
            }
            b')' => {
                i += 1;
                tokens.push(Token::Unquoted(&args[start..i]));
            }
            _ => {
                i = unquoted_end(bytes, i);
                let word = &args[start..i];
                let open = skip_blanks(bytes, i);
                if is_identifier(word) && bytes.get(open) == Some(&b'(') {
                    i = matching_paren(bytes, open).map_or(bytes.len(), |close| close + 1);
                    tokens.push(Token::Nested(&args[start..i]));
                } else {
                    tokens.push(Token::Unquoted(word));
                }
            }
        }
    }

    tokens
}

/// Offset of the `)` matching the `(` at `open`, skipping quoted text,
/// comments and bracket arguments. `None` when the input ends first.
#[must_use]
pub fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
                i += 1;
            }
            b'"' => i = skip_quoted(bytes, i),
            b'#' => i = skip_comment(bytes, i),
            b'[' if bracket_open_len(bytes, i).is_some() => i = skip_bracket(bytes, i),
            b'\\' => i += 2,
            _ => i += 1,
        }
    }

    None
}

const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

const fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_identifier(word: &str) -> bool {
    let bytes = word.as_bytes();
    !bytes.is_empty() && is_ident_start(bytes[0]) && bytes.iter().all(|&b| is_ident_char(b))
}

fn ident_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_ident_char(bytes[i]) {
        i += 1;
    }
    i
}

/// Skips spaces and tabs only; CMake does not allow a newline between a
/// command name and its `(`.
fn skip_blanks(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    i
}

fn unquoted_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() => break,
            b'(' | b')' => break,
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii) => i += 2,
            _ => i += 1,
        }
    }
    i.min(bytes.len())
}

/// Returns the offset of the terminating newline (not consumed) or the end of
/// a bracket comment.
fn skip_comment(bytes: &[u8], i: usize) -> usize {
    if bracket_open_len(bytes, i + 1).is_some() {
        return skip_bracket(bytes, i + 1);
    }
    bytes[i..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |pos| i + pos)
}

fn skip_quoted(bytes: &[u8], i: usize) -> usize {
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'"' => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

/// Number of `=` in a bracket opening (`[[` is 0, `[==[` is 2) at `i`.
fn bracket_open_len(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) != Some(&b'[') {
        return None;
    }
    let mut j = i + 1;
    while bytes.get(j) == Some(&b'=') {
        j += 1;
    }
    (bytes.get(j) == Some(&b'[')).then_some(j - i - 1)
}

fn skip_bracket(bytes: &[u8], i: usize) -> usize {
    let Some(eq) = bracket_open_len(bytes, i) else {
        return i + 1;
    };
    let mut closing = Vec::with_capacity(eq + 2);
    closing.push(b']');
    closing.extend(std::iter::repeat_n(b'=', eq));
    closing.push(b']');

    let body = i + eq + 2;
    bytes[body.min(bytes.len())..]
        .windows(closing.len())
        .position(|window| window == closing.as_slice())
        .map_or(bytes.len(), |pos| body + pos + closing.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_invocation_anywhere_on_line() {
        let line = "add_executable(Game main.c) target_link_libraries(Game\n";
        assert_eq!(find_invocation(line, "target_link_libraries"), Some(28));
        assert_eq!(find_invocation("  TARGET_LINK_LIBRARIES (App x)", "target_link_libraries"), Some(2));
        assert_eq!(find_invocation("# target_link_libraries(App x)\n", "target_link_libraries"), None);
        assert_eq!(find_invocation("message(\"target_link_libraries(App)\")", "target_link_libraries"), None);
        assert_eq!(find_invocation("set(target_link_libraries(x))", "target_link_libraries"), None);
        assert_eq!(find_invocation("my_target_link_libraries(App x)", "target_link_libraries"), None);
    }

    #[test]
    fn test_finds_single_line_commands() {
        let text = "cmake_minimum_required(VERSION 3.13)\nadd_executable(Game main.c)\n";
        let found = commands(text);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "cmake_minimum_required");
        assert!(found[1].is("add_executable"));
        assert_eq!(found[1].args(), "Game main.c");
        assert_eq!(&text[found[1].start..found[1].end()], "add_executable(Game main.c)");
    }

    #[test]
    fn test_multiline_command_and_case_insensitive_name() {
        let text = "TARGET_LINK_LIBRARIES(Game\n    pico_stdlib\n    hardware_pwm\n)\n";
        let found = commands(text);

        assert_eq!(found.len(), 1);
        assert!(found[0].is("target_link_libraries"));
        assert_eq!(found[0].first_argument(), Some("Game"));
        assert_eq!(found[0].end(), text.len() - 1);
    }

    #[test]
    fn test_commented_out_command_is_ignored() {
        let text = "# add_executable(Old old.c)\nadd_executable(New new.c)\n";
        let found = commands(text);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_argument(), Some("New"));
    }

    #[test]
    fn test_paren_inside_quotes_does_not_close() {
        let text = "target_link_libraries(Game \"odd)name\" other)\n";
        let found = commands(text);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].args(), "Game \"odd)name\" other");
    }

    #[test]
    fn test_unterminated_command_is_skipped() {
        let text = "target_link_libraries(Game pico_stdlib\nadd_executable(Game main.c)\n";
        let found = commands(text);

        assert_eq!(found.len(), 1);
        assert!(found[0].is("add_executable"));
    }

    #[test]
    fn test_nested_invocation_not_reported_at_top_level() {
        let text = "if(PICO_SDK)\n  target_link_libraries(Game pico_stdlib)\nendif()\n";
        let names: Vec<_> = commands(text).iter().map(|c| c.name).collect();

        assert_eq!(names, vec!["if", "target_link_libraries", "endif"]);
    }

    #[test]
    fn test_tokenize_mixed_arguments() {
        let tokens = tokenize(
            "Game # main target\n  PRIVATE \"quoted lib\" ${EXTRA_LIBS} [[raw]] target_sources(Game a.c)",
        );

        assert_eq!(
            tokens,
            vec![
                Token::Unquoted("Game"),
                Token::Comment("# main target"),
                Token::Unquoted("PRIVATE"),
                Token::Quoted("\"quoted lib\""),
                Token::Unquoted("${EXTRA_LIBS}"),
                Token::Bracket("[[raw]]"),
                Token::Nested("target_sources(Game a.c)"),
            ]
        );
        assert_eq!(tokens[3].value(), "quoted lib");
        assert_eq!(tokens[5].value(), "raw");
    }

    #[test]
    fn test_tokenize_generator_expression_stays_whole() {
        let tokens = tokenize("Game $<$<CONFIG:Debug>:debug_lib>");
        assert_eq!(tokens[1], Token::Unquoted("$<$<CONFIG:Debug>:debug_lib>"));
    }

    #[test]
    fn test_bracket_comment_spanning_lines() {
        let text = "#[[ add_executable(Hidden x.c)\n ]]\nadd_executable(Shown y.c)";
        let found = commands(text);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_argument(), Some("Shown"));
    }

    #[test]
    fn test_matching_paren_unbalanced() {
        assert_eq!(matching_paren(b"(a (b)", 0), None);
        assert_eq!(matching_paren(b"(a (b) c)", 0), Some(8));
    }
}
