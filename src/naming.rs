//! Naming normalization: case conversion, comment cleanup and identifier
//! sanitization.

use convert_case::{Case, Casing};

pub fn pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

pub fn camel_case(s: &str) -> String {
    s.to_case(Case::Camel)
}

pub fn snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Lowercase the first character, leaving the rest untouched.
///
/// Used for exposing RPC names as GraphQL root fields (`GetProduct` ->
/// `getProduct`).
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// GraphQL field name for a proto field name.
pub fn field_name(proto_name: &str) -> String {
    sanitize_identifier(&camel_case(proto_name))
}

/// Whether a field name looks like an identifier (`id`, `user_id`, `userId`).
pub fn is_id_name(name: &str) -> bool {
    name == "id" || name.ends_with("_id") || name.ends_with("Id")
}

/// Turn a source comment into single-spaced prose.
///
/// Leading comment delimiters and whitespace are stripped from every line and
/// continuation lines are joined with a single space.
pub fn clean_comment(comment: &str) -> String {
    comment
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['/', '*', '#'])
                .trim_end_matches("*/")
                .trim()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop characters that are not valid in a GraphQL name.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
