//! `#define` extraction, line by line.

use crate::model::MacroRecord;
use regex::Regex;
use std::sync::LazyLock;

static RE_DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*define\s+([A-Za-z_]\w*)(\([^)]*\))?(.*)$").unwrap()
});

static RE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/|//.*").unwrap());

static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Scan all `#define` directives.
///
/// Continuation lines are joined, comments are removed from the body, and
/// directives without a value (include guards) are skipped.
pub fn parse(src: &str) -> Vec<MacroRecord> {
    let lines: Vec<&str> = src.lines().collect();
    let mut macros = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line_number = i + 1;
        let mut joined = lines[i].to_string();
        while let Some(stripped) = joined.trim_end().strip_suffix('\\') {
            let stripped = stripped.trim_end().to_string();
            i += 1;
            match lines.get(i) {
                Some(next) => joined = format!("{} {}", stripped, next.trim()),
                None => {
                    joined = stripped;
                    break;
                }
            }
        }
        i += 1;

        let Some(caps) = RE_DEFINE.captures(&joined) else {
            continue;
        };
        let body = caps.get(3).map_or("", |m| m.as_str());
        let value = RE_COMMENT.replace_all(body, "");
        let value = RE_WS.replace_all(value.trim(), " ").to_string();
        if value.is_empty() {
            continue;
        }

        macros.push(MacroRecord {
            name: caps[1].to_string(),
            parameters: caps.get(2).map(|m| m.as_str().to_string()),
            value,
            line_number,
        });
    }

    macros
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_and_continued() {
        let src = "#define FOO 1\n#define BAR \\\n2\n";
        let macros = parse(src);
        assert_eq!(macros.len(), 2);
        assert_eq!(macros[0].name, "FOO");
        assert_eq!(macros[0].value, "1");
        assert_eq!(macros[1].name, "BAR");
        assert_eq!(macros[1].value, "2");
        assert_eq!(macros[1].line_number, 2);
    }

    #[test]
    fn include_guard_skipped() {
        let src = "#ifndef X_H\n#define X_H\n#define LIMIT (10u) /* max */\n#endif\n";
        let macros = parse(src);
        assert_eq!(macros.len(), 1);
        assert_eq!(macros[0].name, "LIMIT");
        assert_eq!(macros[0].value, "(10u)");
        assert_eq!(macros[0].line_number, 3);
    }

    #[test]
    fn function_like_macro() {
        let src = "#define MAX(a, b) \\\n    ((a) > (b) ? (a) : (b)) // pick\n";
        let macros = parse(src);
        assert_eq!(macros[0].name, "MAX");
        assert_eq!(macros[0].parameters.as_deref(), Some("(a, b)"));
        assert_eq!(macros[0].value, "((a) > (b) ? (a) : (b))");
    }

    #[test]
    fn object_like_with_parenthesized_value() {
        let macros = parse("#define ZERO (0)\n");
        assert!(macros[0].parameters.is_none());
        assert_eq!(macros[0].value, "(0)");
    }

    #[test]
    fn line_numbers_after_continuation() {
        let src = "#define A \\\n  1 \\\n  2\n\n#define B 3\n";
        let macros = parse(src);
        assert_eq!(macros[0].value, "1 2");
        assert_eq!(macros[1].line_number, 5);
    }

    #[test]
    fn comment_only_body_skipped() {
        assert!(parse("#define EMPTY /* nothing */\n").is_empty());
    }

    #[test]
    fn trailing_backslash_at_eof() {
        let macros = parse("#define T 7 \\");
        assert_eq!(macros[0].value, "7");
    }
}
