//! Identifier case conversion.
//!
//! The generator receives table, column and prefix names in whatever style
//! the user typed them (`user_id`, `userId`, `UserId`, `HTTPServer`) and
//! needs two canonical forms out of them:
//!
//! - [`normalize`]: PascalCase, for type names (`BaseUsers`, `UsersPk`).
//! - [`to_snake_case`]: snake_case, for struct fields and SQL column names.
//!
//! Both are pure and total: every input produces a string, possibly empty.

/// Separators that always end a word.
fn is_delimiter(c: char) -> bool {
    c == '_' || c == '-' || c.is_whitespace()
}

/// Split on runs of delimiters, dropping empty pieces.
fn segments(input: &str) -> Vec<&str> {
    input.split(is_delimiter).filter(|s| !s.is_empty()).collect()
}

/// Split a segment where a lowercase letter is followed by an uppercase one.
///
/// Uppercase runs are never split, so `HTTPServer` stays a single word here.
fn split_case_transitions(segment: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;

    for (i, c) in segment.char_indices() {
        if let Some(p) = prev {
            if c.is_uppercase() && p.is_lowercase() {
                words.push(&segment[start..i]);
                start = i;
            }
        }
        prev = Some(c);
    }
    words.push(&segment[start..]);
    words
}

/// Split a segment into lowercase-able words, also ending acronym runs.
///
/// `HTTPServer` becomes `HTTP` + `Server`, `address2Line` becomes
/// `address2` + `Line`.
fn split_words(segment: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = segment.char_indices().collect();
    let mut words = Vec::new();
    let mut start = 0;

    for w in 1..chars.len() {
        let (i, c) = chars[w];
        let prev = chars[w - 1].1;
        let next = chars.get(w + 1).map(|(_, n)| *n);

        let lower_to_upper = c.is_uppercase() && (prev.is_lowercase() || prev.is_ascii_digit());
        let acronym_end =
            c.is_uppercase() && prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase());

        if lower_to_upper || acronym_end {
            words.push(&segment[start..i]);
            start = i;
        }
    }
    if start < segment.len() {
        words.push(&segment[start..]);
    }
    words
}

/// Upper-case the first character, leave the rest untouched.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert an identifier in snake_case, kebab-case, camelCase, PascalCase or
/// a mix of them into PascalCase.
///
/// Only a lone segment (no `_`, `-` or whitespace in it) is split on case
/// transitions; once the input carries delimiters, each delimited piece is
/// kept as one word and only its first letter is raised. Acronym runs keep
/// their casing.
///
/// # Example
///
/// ```
/// use daokit::case::normalize;
///
/// assert_eq!(normalize("first_name"), "FirstName");
/// assert_eq!(normalize("httpServer"), "HttpServer");
/// assert_eq!(normalize(" HTTPServer"), "HTTPServer");
/// assert_eq!(normalize("   "), "");
/// ```
pub fn normalize(identifier: &str) -> String {
    let segments = segments(identifier);
    let words = match segments.as_slice() {
        [single] => split_case_transitions(single),
        _ => segments,
    };
    words.into_iter().map(capitalize).collect()
}

/// Convert an identifier into snake_case.
///
/// Every delimited piece is split on case transitions and at the end of
/// acronym runs, then lower-cased and joined with `_`.
///
/// ```
/// use daokit::case::to_snake_case;
///
/// assert_eq!(to_snake_case("UpdatedAt"), "updated_at");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// ```
pub fn to_snake_case(identifier: &str) -> String {
    segments(identifier)
        .into_iter()
        .flat_map(split_words)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Whether `word` is reserved in Rust 2024.
pub fn is_rust_keyword(word: &str) -> bool {
    RUST_KEYWORDS.contains(&word)
}

/// snake_case field name for a column, as a raw identifier when it collides
/// with a keyword (`type` -> `r#type`).
///
/// `self`, `Self`, `super` and `crate` cannot be raw identifiers and get a
/// trailing underscore instead.
pub fn field_ident(column: &str) -> String {
    let snake = to_snake_case(column);
    match snake.as_str() {
        "self" | "super" | "crate" => format!("{}_", snake),
        s if is_rust_keyword(s) => format!("r#{}", s),
        _ => snake,
    }
}
