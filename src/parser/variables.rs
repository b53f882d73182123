//! File-scope variable declarations.
//!
//! Runs on an offset-preserving copy of the source with comments and
//! preprocessor lines blanked out, so every match offset is also an offset
//! into the original text.

use super::balance::find_balanced;
use super::comments::{blank_comments, blank_preprocessor, LineIndex};
use crate::model::{Scope, VariableRecord};
use regex::Regex;
use std::sync::LazyLock;

/// Qualifiers, then an AUTOSAR type macro or a plain (pointer) type.
macro_rules! type_pattern {
    () => {
        concat!(
            r"(?P<type>(?:(?:const|volatile|unsigned|signed|struct|union|enum)\s+)*",
            r"(?:(?:CONSTP2VAR|CONSTP2CONST|P2VAR|P2CONST|VAR|CONST)\s*\([^()]*\)\s*",
            r"|[A-Za-z_]\w*(?:\s*\*+\s*|\s+)))",
        )
    };
}

static RE_EXTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]*extern\s+",
        type_pattern!(),
        r"(?P<name>[A-Za-z_]\w*)\s*(?P<dims>(?:\[[^\]]*\]\s*)*);",
    ))
    .unwrap()
});

static RE_SCALAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]*(?P<static>static\s+)?",
        type_pattern!(),
        r"(?P<name>[A-Za-z_]\w*)\s*(?:=\s*(?P<init>[^;]*))?;",
    ))
    .unwrap()
});

static RE_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]*(?P<static>static\s+)?",
        type_pattern!(),
        r"(?P<name>[A-Za-z_]\w*)\s*(?P<dims>(?:\[[^\]]*\]\s*)+)(?:=\s*(?P<init>[^;]*))?;",
    ))
    .unwrap()
});

/// `name(...) {`: a function definition opening.
static RE_FUNCTION_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_]\w*\s*\([^;{}]*\)\s*\{").unwrap());

/// `struct Tag {`, `typedef union {`, `enum {`
static RE_AGGREGATE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:struct|union|enum)\b[^;{}()=]*\{").unwrap());

static RE_TYPEDEF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btypedef\b").unwrap());

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z_]\w*").unwrap());

static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Never a variable name or base type.
const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "default", "return", "break",
    "continue", "goto", "sizeof", "typedef", "extern", "static", "register", "auto", "inline",
];

/// Legal inside a type, but never as the declared name.
const QUALIFIERS: &[&str] = &[
    "const", "volatile", "unsigned", "signed", "struct", "union", "enum",
];

/// Extract file-scope variables, sorted by position in the source.
pub fn parse(src: &str) -> Vec<VariableRecord> {
    let code = blank_preprocessor(&blank_comments(src));
    let excluded = excluded_spans(&code);
    let lines = LineIndex::new(src);

    let mut found: Vec<(usize, VariableRecord)> = Vec::new();
    let shapes: [(&Regex, Option<Scope>); 3] = [
        (&*RE_EXTERN, Some(Scope::Extern)),
        (&*RE_SCALAR, None),
        (&*RE_ARRAY, None),
    ];

    for (re, fixed_scope) in shapes {
        for caps in re.captures_iter(&code) {
            let Some(whole) = caps.get(0) else { continue };
            let text = whole.as_str();
            if text.contains("(*") || RE_TYPEDEF.is_match(text) {
                continue;
            }
            let start = whole.start() + (text.len() - text.trim_start().len());
            if excluded.iter().any(|&(open, close)| start > open && start < close) {
                continue;
            }

            let name = &caps["name"];
            let data_type = normalize_type(&caps["type"]);
            if is_keyword(name) || QUALIFIERS.contains(&name) || type_has_keyword(&data_type) {
                continue;
            }

            let dims = caps
                .name("dims")
                .map(|m| RE_WS.replace_all(m.as_str(), "").to_string())
                .unwrap_or_default();
            let scope = fixed_scope.unwrap_or(if caps.name("static").is_some() {
                Scope::StaticGlobal
            } else {
                Scope::Global
            });
            let initial_value = caps
                .name("init")
                .map(|m| RE_WS.replace_all(m.as_str().trim(), " ").to_string())
                .unwrap_or_default();

            found.push((
                start,
                VariableRecord {
                    name: name.to_string(),
                    data_type: format!("{}{}", data_type, dims),
                    initial_value,
                    scope,
                    line_number: lines.line_of(start),
                },
            ));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, record)| record).collect()
}

/// Brace ranges of function bodies and struct/union/enum definitions.
fn excluded_spans(code: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for re in [&*RE_FUNCTION_OPEN, &*RE_AGGREGATE_OPEN] {
        for m in re.find_iter(code) {
            let open = m.end() - 1;
            if let Ok(close) = find_balanced(code, open, b'{', b'}') {
                spans.push((open, close));
            }
        }
    }
    spans
}

/// Collapse whitespace and glue pointer stars to the base type.
fn normalize_type(raw: &str) -> String {
    let collapsed = RE_WS.replace_all(raw.trim(), " ");
    collapsed.replace(" *", "*")
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn type_has_keyword(data_type: &str) -> bool {
    RE_WORD
        .find_iter(data_type)
        .any(|m| is_keyword(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(src: &str) -> Vec<String> {
        parse(src).into_iter().map(|v| v.name).collect()
    }

    #[test]
    fn local_variable_is_not_global() {
        assert!(names("void f(void) { int x; }\n").is_empty());
        assert!(names("void f(void)\n{\n    int x;\n    x = 1;\n}\n").is_empty());
    }

    #[test]
    fn three_shapes_and_scopes() {
        let src = "extern uint16 g_ext;\nstatic uint8 s_count = 0u;\nuint32 g_total;\nstatic uint8 s_buf[4] = {1, 2, 3, 4};\n";
        let vars = parse(src);
        assert_eq!(vars.len(), 4);

        assert_eq!(vars[0].name, "g_ext");
        assert_eq!(vars[0].scope, Scope::Extern);
        assert_eq!(vars[0].data_type, "uint16");

        assert_eq!(vars[1].name, "s_count");
        assert_eq!(vars[1].scope, Scope::StaticGlobal);
        assert_eq!(vars[1].initial_value, "0u");

        assert_eq!(vars[2].name, "g_total");
        assert_eq!(vars[2].scope, Scope::Global);
        assert_eq!(vars[2].initial_value, "");

        assert_eq!(vars[3].name, "s_buf");
        assert_eq!(vars[3].data_type, "uint8[4]");
        assert_eq!(vars[3].initial_value, "{1, 2, 3, 4}");
        assert_eq!(vars[3].line_number, 4);
    }

    #[test]
    fn struct_members_excluded() {
        let src = "typedef struct {\n    uint8 a;\n    uint16 b;\n} Cfg_t;\nstruct Tag {\n  int m;\n};\nCfg_t g_cfg;\n";
        assert_eq!(names(src), vec!["g_cfg"]);
    }

    #[test]
    fn function_pointers_and_typedefs_excluded() {
        let src = "typedef uint8 Byte;\nvoid (*cb)(void);\nstatic void (*handler)(int) = 0;\n";
        assert!(names(src).is_empty());
    }

    #[test]
    fn keywords_rejected() {
        let src = "return x;\nelse y;\n";
        assert!(names(src).is_empty());
    }

    #[test]
    fn comments_and_preprocessor_ignored() {
        let src = "/* uint8 hidden; */\n#define X \\\n  uint8 alsohidden;\n// int nope;\nconst uint8 g_visible = 3;\n";
        let vars = parse(src);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "g_visible");
        assert_eq!(vars[0].data_type, "const uint8");
        assert_eq!(vars[0].line_number, 5);
    }

    #[test]
    fn autosar_var_macro_type() {
        let src = "static VAR(uint8, APP_VAR) s_state = 1;\nP2VAR(uint8, AUTOMATIC, APP_VAR) g_ptr;\n";
        let vars = parse(src);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].data_type, "VAR(uint8, APP_VAR)");
        assert_eq!(vars[1].name, "g_ptr");
    }

    #[test]
    fn pointer_type_normalized() {
        let vars = parse("uint8 * g_p;\n");
        assert_eq!(vars[0].data_type, "uint8*");
    }

    #[test]
    fn prototypes_are_not_variables() {
        assert!(names("extern void f(void);\nint g(int a);\n").is_empty());
    }

    #[test]
    fn declarations_after_function_are_found() {
        let src = "void f(void)\n{\n  if (a) { b(); }\n}\nuint8 g_after;\n";
        assert_eq!(names(src), vec!["g_after"]);
    }
}
