//! Textual name parsers
//!
//! `parse_simple_name` handles dotted package paths (`core.lang.Str`).
//! `parse_complex_name` additionally understands parameter groups whose
//! arguments are names themselves (`Rule(Expr, lang.Token).alt`), which is
//! how grammar patterns refer to rules taking other rules as arguments.

use super::qualified::{NamePart, QualifiedName};

/// Parse a dotted name. The empty string is the root name; a trailing dot
/// produces one empty trailing part (`"a."` is `["a", ""]`).
pub fn parse_simple_name(src: &str) -> QualifiedName {
    if src.is_empty() {
        return QualifiedName::root();
    }
    src.split('.').map(NamePart::simple).collect()
}

/// Parse a name that may contain recursive parameter groups.
///
/// Returns `None` on unmatched parentheses, on an empty argument, and on
/// any content following a closed group other than `.` or the end.
pub fn parse_complex_name(src: &str) -> Option<QualifiedName> {
    let mut name = QualifiedName::root();
    if src.is_empty() {
        return Some(name);
    }

    let mut rest = src;
    loop {
        let end = rest
            .find(|c: char| matches!(c, '.' | '(' | ')'))
            .unwrap_or(rest.len());
        let text = &rest[..end];
        rest = &rest[end..];

        match rest.as_bytes().first() {
            None => {
                name.push(NamePart::simple(text));
                return Some(name);
            }
            Some(b'.') => {
                name.push(NamePart::simple(text));
                rest = &rest[1..];
            }
            Some(b'(') => {
                let close = matching_paren(rest)?;
                let nested = parse_arguments(&rest[1..close])?;
                name.push(NamePart::recursive(text, nested));
                rest = &rest[close + 1..];

                match rest.as_bytes().first() {
                    None => return Some(name),
                    Some(b'.') => rest = &rest[1..],
                    Some(_) => return None,
                }
            }
            // A ')' before any '(' has nothing to close.
            Some(_) => return None,
        }
    }
}

/// Byte index of the ')' closing the '(' at the start of `src`
fn matching_paren(src: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in src.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_arguments(inner: &str) -> Option<Vec<QualifiedName>> {
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }

    split_top_level(inner, ',')
        .into_iter()
        .map(|arg| {
            let arg = arg.trim();
            if arg.is_empty() {
                None
            } else {
                parse_complex_name(arg)
            }
        })
        .collect()
}

/// Split on `sep` where it is not nested inside parentheses
fn split_top_level(src: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in src.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                pieces.push(&src[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&src[start..]);
    pieces
}
