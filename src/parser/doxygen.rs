//! Doxygen description lookup for function definitions.

use super::comments::{line_start, Comment};
use regex::Regex;
use std::sync::LazyLock;

/// Generated file headers carry this marker and never describe a function.
const GENERATED_MARKER: &str = "DO NOT CHANGE THIS COMMENT!";

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[@\\]([A-Za-z]+)\b\s*(.*)$").unwrap());

static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Description for the function whose signature line starts at `start`.
///
/// Returns an empty string when no documentation block is attached.
pub fn describe(src: &str, comments: &[Comment<'_>], start: usize) -> String {
    let lines = triple_slash_block(src, start)
        .or_else(|| block_comment(src, comments, start))
        .unwrap_or_default();
    summarize(&lines)
}

/// Contiguous `///` lines directly above the signature line.
fn triple_slash_block(src: &str, start: usize) -> Option<Vec<String>> {
    let before = &src[..line_start(src, start)];
    let mut lines: Vec<String> = before
        .lines()
        .rev()
        .map(str::trim)
        .take_while(|l| l.starts_with("///"))
        .map(|l| l.trim_start_matches('/').trim_start_matches('<').trim().to_string())
        .collect();
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines)
}

/// Closest `/** */` or `/*! */` block separated from the function by nothing
/// but whitespace and other comments.
///
/// Walks backwards one comment at a time and stops at the first gap that
/// holds code, so each lookup only touches the comments directly above.
fn block_comment(src: &str, comments: &[Comment<'_>], start: usize) -> Option<Vec<String>> {
    let above = comments.partition_point(|c| c.end <= start);
    let mut cursor = start;
    for c in comments[..above].iter().rev() {
        if !src[c.end..cursor].trim().is_empty() {
            return None;
        }
        let is_doc = c.is_block && (c.text.starts_with("/**") || c.text.starts_with("/*!"));
        if is_doc && !c.text.contains(GENERATED_MARKER) {
            return Some(comment_lines(c.text));
        }
        cursor = c.start;
    }
    None
}

/// Strip comment delimiters and leading `*` gutters.
fn comment_lines(text: &str) -> Vec<String> {
    let inner = text
        .strip_prefix("/**")
        .or_else(|| text.strip_prefix("/*!"))
        .unwrap_or(text);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    inner
        .lines()
        .map(|l| {
            let l = l.trim();
            l.strip_prefix('*').unwrap_or(l).trim().to_string()
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Brief,
    Details,
    Other,
}

/// Reduce a doc block to `"brief. details"`, `"brief"`, or `"details"`.
fn summarize(lines: &[String]) -> String {
    let mut brief: Vec<&str> = Vec::new();
    let mut details: Vec<&str> = Vec::new();
    let mut section = Section::None;

    for line in lines {
        if let Some(caps) = RE_TAG.captures(line) {
            let rest = caps.get(2).map_or("", |m| m.as_str());
            section = match &caps[1] {
                "brief" | "short" => Section::Brief,
                "details" => Section::Details,
                _ => Section::Other,
            };
            match section {
                Section::Brief if !rest.is_empty() => brief.push(rest),
                Section::Details if !rest.is_empty() => details.push(rest),
                _ => {}
            }
            continue;
        }
        match section {
            Section::Brief if line.is_empty() => section = Section::None,
            Section::Brief => brief.push(line),
            Section::Details if line.is_empty() => section = Section::None,
            Section::Details => details.push(line),
            _ => {}
        }
    }

    let brief = collapse(&brief);
    let details = collapse(&details);
    match (brief.is_empty(), details.is_empty()) {
        (false, false) => format!("{}. {}", brief.trim_end_matches('.'), details),
        (false, true) => brief,
        (true, false) => details,
        (true, true) => first_paragraph(lines),
    }
}

/// First run of untagged, non-empty lines.
fn first_paragraph(lines: &[String]) -> String {
    let paragraph: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .skip_while(|l| l.is_empty())
        .take_while(|l| !l.is_empty() && !RE_TAG.is_match(l))
        .collect();
    collapse(&paragraph)
}

fn collapse(parts: &[&str]) -> String {
    RE_WS.replace_all(&parts.join(" "), " ").trim().to_string()
}
