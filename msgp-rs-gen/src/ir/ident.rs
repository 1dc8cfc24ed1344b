//! Rust identifier and path checks.
//!
//! A shape is printable only when every name it places into generated code
//! is something the Rust parser accepts in that position.

const STRICT_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv",
    "try", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Check whether `s` is a reserved word usable only as a raw identifier.
pub fn is_keyword(s: &str) -> bool {
    STRICT_KEYWORDS.contains(&s)
}

fn is_ident_syntax(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Check whether `s` can name a type, field or function.
pub fn is_ident(s: &str) -> bool {
    is_ident_syntax(s) && !NON_RAW_KEYWORDS.contains(&s)
}

/// Check whether `s` is a path such as `Kind` or `crate::units::Kind`.
///
/// Path roots `crate`, `self` and `super` are allowed in leading position.
pub fn is_path(s: &str) -> bool {
    let segments: Vec<&str> = s.split("::").collect();
    segments.iter().enumerate().all(|(i, seg)| {
        let root = i == 0 && matches!(*seg, "crate" | "self" | "super");
        let inner_super = i > 0 && *seg == "super" && segments[i - 1] == "super";
        root || inner_super || (is_ident(seg) && !is_keyword(seg))
    }) && segments.last().is_some_and(|seg| is_ident(seg))
}

/// Check whether `s` can be used as a struct field name.
///
/// Tuple struct fields are named by their position (`0`, `1`, ...).
pub fn is_field_name(s: &str) -> bool {
    is_ident(s) || is_tuple_index(s)
}

fn is_tuple_index(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'))
}

/// Render a field name as it must appear after `.` in generated code.
pub fn field_ident(s: &str) -> String {
    if is_keyword(s) {
        format!("r#{}", s)
    } else {
        s.to_string()
    }
}

/// Render a type name or path for a `for` clause in an impl header.
pub fn type_ident(s: &str) -> String {
    if is_keyword(s) {
        format!("r#{}", s)
    } else {
        s.to_string()
    }
}
