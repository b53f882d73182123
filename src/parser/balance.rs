//! Balanced delimiter matching.
//!
//! Stands in for a real parser wherever a parameter list, function body,
//! struct body or control-flow condition has to be delimited. Delimiters
//! inside string literals, character literals and comments do not count.

use super::comments::{skip_block_comment, skip_line_comment, skip_literal};

/// No matching closing delimiter before end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unbalanced;

/// Find the closing delimiter matching the opener at `open_idx`.
///
/// Returns the byte offset of the closing delimiter. Fails if `open_idx`
/// does not hold `open` or if input ends at non-zero depth.
pub fn find_balanced(text: &str, open_idx: usize, open: u8, close: u8) -> Result<usize, Unbalanced> {
    let bytes = text.as_bytes();
    if bytes.get(open_idx) != Some(&open) {
        return Err(Unbalanced);
    }

    let mut depth = 1usize;
    let mut i = open_idx + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            i = skip_literal(bytes, i);
            continue;
        }
        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i = skip_block_comment(bytes, i);
            continue;
        }
        if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            i = skip_line_comment(bytes, i);
            continue;
        }
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
        }
        i += 1;
    }
    Err(Unbalanced)
}

/// Split on commas that are not nested inside `()` or `[]`.
///
/// Fragments are trimmed; empty fragments are dropped.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
