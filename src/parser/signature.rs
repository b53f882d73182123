//! Function definitions under the three naming conventions.
//!
//! Each category regex only locates a candidate `name(`. Everything after
//! that (parameter list, prototype check, body) is delimited with the
//! balanced-span finder on a copy of the source with comments and
//! preprocessor lines blanked out.

use super::balance::{find_balanced, split_top_level};
use super::classify;
use super::comments::{
    blank_comments, blank_preprocessor, collect_comments, line_start, skip_trivia, Comment,
    LineIndex,
};
use super::doxygen;
use crate::model::{Category, FunctionRecord, Parameter};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static RE_RUNNABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*FUNC\s*\(\s*(?P<ret>[A-Za-z_]\w*)\s*,\s*[A-Za-z_]\w*\s*\)\s*(?P<name>[A-Za-z_]\w*)\s*\(",
    )
    .unwrap()
});

static RE_STATIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]*static\s+(?:inline\s+)?",
        r"(?:FUNC\s*\(\s*(?P<fret>[A-Za-z_]\w*)\s*,\s*[A-Za-z_]\w*\s*\)\s*",
        r"|(?P<ret>(?:(?:const|volatile|unsigned|signed|struct|union|enum)\s+)*[A-Za-z_]\w*)(?P<ptr>\s*\*+\s*|\s+))",
        r"(?P<name>[A-Za-z_]\w*)\s*\(",
    ))
    .unwrap()
});

static RE_GLOBAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]*(?P<ret>(?:(?:const|volatile|unsigned|signed|struct|union|enum)\s+)*[A-Za-z_]\w*)",
        r"(?P<ptr>\s*\*+\s*|\s+)(?P<name>[A-Za-z_]\w*)\s*\(",
    ))
    .unwrap()
});

/// Permissive re-read of a signature start, used for the display syntax.
static RE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\A[ \t]*(?:static\s+)?(?:inline\s+)?",
        r"(?:FUNC\s*\(\s*(?P<fret>[^,()]*),[^)]*\)\s*)?",
        r"(?P<ret>(?:[A-Za-z_]\w*(?:\s*\*+\s*|\s+))*?)(?P<name>[A-Za-z_]\w*)\s*\(",
    ))
    .unwrap()
});

static RE_PARAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_]\w*)\s*(?:\[[^\]]*\]\s*)*$").unwrap());

static RE_TRIGGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-\s*triggered\s+(?:on|by)\s+([^\n\r]+)").unwrap());

static RE_RTE_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Rte_(?:Read|DRead|IRead|Receive|IReadRef|IrvRead|IsUpdated|Mode_)\w*)\s*\(")
        .unwrap()
});

static RE_RTE_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Rte_(?:Write|IrvWrite|IWrite|IWriteRef|Switch)\w*)\s*\(").unwrap()
});

static RE_RTE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(Rte_Call_\w+)\s*\(").unwrap());

static RE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_]\w*)\s*\(").unwrap());

static RE_ALL_CAPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

static RE_LOCAL_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_]\w*)\s+[A-Za-z_]\w*\s*[=;]").unwrap());

static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Words that look like calls or types but are not.
const RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "do", "else", "case", "sizeof", "abs", "return", "goto",
];

/// Memory primitives never listed as invoked operations.
const EXCLUDED_CALLS: &[&str] = &[
    "VStdLib_MemCpy",
    "VStdLib_MemSet",
    "VStdLib_MemCmp",
    "memcmp",
    "memcpy",
    "memset",
];

/// A global candidate whose first type token is one of these is a statement.
const NOT_A_TYPE: &[&str] = &[
    "static", "FUNC", "typedef", "extern", "return", "else", "case", "default", "do", "if", "for",
    "while", "switch", "goto", "sizeof", "break", "continue",
];

/// Control-flow words that `word (` matches but that never name a function.
const NOT_A_NAME: &[&str] = &["if", "for", "while", "switch", "do", "else", "case", "return", "sizeof"];

/// Source text prepared once and shared by the category scans.
pub struct Prepared<'a> {
    src: &'a str,
    code: String,
    comments: Vec<Comment<'a>>,
    lines: LineIndex,
}

impl<'a> Prepared<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            code: blank_preprocessor(&blank_comments(src)),
            comments: collect_comments(src),
            lines: LineIndex::new(src),
        }
    }
}

/// A function definition and the offset of its parameter list's `(`.
///
/// The offset identifies the physical definition across category scans.
#[derive(Debug)]
pub struct Found {
    pub paren: usize,
    pub record: FunctionRecord,
}

/// Run the scan for one category, in source order.
pub fn scan(prepared: &Prepared<'_>, category: Category) -> Result<Vec<Found>, regex::Error> {
    let re: &Regex = match category {
        Category::Runnable => &*RE_RUNNABLE,
        Category::Static => &*RE_STATIC,
        Category::Global => &*RE_GLOBAL,
    };

    let mut found = Vec::new();
    for caps in re.captures_iter(&prepared.code) {
        let Some(whole) = caps.get(0) else { continue };
        let name = &caps["name"];

        let return_type = match category {
            Category::Runnable => caps["ret"].to_string(),
            Category::Static | Category::Global => {
                if let Some(fret) = caps.name("fret") {
                    fret.as_str().to_string()
                } else {
                    let ret = &caps["ret"];
                    let ptr = caps.name("ptr").map_or("", |m| m.as_str());
                    if ptr.contains('*') {
                        format!("{}*", ret)
                    } else {
                        ret.to_string()
                    }
                }
            }
        };

        if category == Category::Global {
            let first = caps["ret"].split_whitespace().next().unwrap_or_default();
            if NOT_A_TYPE.contains(&first) || NOT_A_NAME.contains(&name) {
                continue;
            }
        }

        let text = whole.as_str();
        let start = whole.start() + (text.len() - text.trim_start().len());
        let paren = whole.end() - 1;

        if let Some(record) = assemble(prepared, category, start, paren, name, &return_type)? {
            found.push(Found { paren, record });
        }
    }
    Ok(found)
}

/// Delimit, classify and describe one candidate. `None` for prototypes and
/// unbalanced input.
fn assemble(
    prepared: &Prepared<'_>,
    category: Category,
    start: usize,
    paren: usize,
    name: &str,
    captured_return: &str,
) -> Result<Option<FunctionRecord>, regex::Error> {
    let code = prepared.code.as_str();

    let Ok(paren_close) = find_balanced(code, paren, b'(', b')') else {
        tracing::debug!(function = name, "unbalanced parameter list, skipped");
        return Ok(None);
    };
    let brace = skip_trivia(code, paren_close + 1);
    if code.as_bytes().get(brace) != Some(&b'{') {
        return Ok(None);
    }
    let Ok(brace_close) = find_balanced(code, brace, b'{', b'}') else {
        tracing::debug!(function = name, "unbalanced body, skipped");
        return Ok(None);
    };

    let raw_params = code[paren + 1..paren_close].trim();
    let body = &code[brace + 1..brace_close];

    let parameters = parameters(raw_params, body)?;
    let (in_params, out_params) = FunctionRecord::partition_params(&parameters);

    let return_type = recovered_return_type(&code[line_start(code, start)..])
        .unwrap_or_else(|| normalize(captured_return));
    let syntax = format!("{} {}({})", return_type, name, collapse(raw_params));

    let trigger = if category == Category::Runnable {
        trigger(&prepared.comments, start)
    } else {
        String::new()
    };

    Ok(Some(FunctionRecord {
        name: name.to_string(),
        return_type,
        syntax,
        category,
        parameters,
        in_params,
        out_params,
        trigger,
        inputs: captures(&RE_RTE_INPUT, body),
        outputs: captures(&RE_RTE_OUTPUT, body),
        invoked_operations: invoked_operations(body, name),
        used_data_types: used_data_types(body),
        description: doxygen::describe(prepared.src, &prepared.comments, start),
        line_number: prepared.lines.line_of(start),
    }))
}

/// Split the raw list and classify each named parameter against the body.
fn parameters(raw: &str, body: &str) -> Result<Vec<Parameter>, regex::Error> {
    let mut params = Vec::new();
    for fragment in split_top_level(raw) {
        if fragment == "void" || fragment == "..." {
            continue;
        }
        let (name, type_fragment) = match RE_PARAM_NAME.captures(fragment).and_then(|c| c.get(1)) {
            Some(m) => (m.as_str(), &fragment[..m.start()]),
            None => (fragment, ""),
        };

        let direction = match classify::macro_override(fragment) {
            Some(direction) => direction,
            None => classify::classify(body, name, type_fragment)?,
        };
        params.push(Parameter {
            name: name.to_string(),
            declaration: collapse(fragment),
            direction,
        });
    }
    Ok(params)
}

fn recovered_return_type(from_line: &str) -> Option<String> {
    let caps = RE_SIGNATURE.captures(from_line)?;
    let ret = normalize(caps.name("ret").map_or("", |m| m.as_str()));
    if !ret.is_empty() {
        return Some(ret);
    }
    caps.name("fret")
        .map(|m| normalize(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Trigger lines of the closest preceding block comment that has any.
fn trigger(comments: &[Comment<'_>], start: usize) -> String {
    let above = comments.partition_point(|c| c.end <= start);
    let Some(comment) = comments[..above]
        .iter()
        .rev()
        .find(|c| c.is_block && RE_TRIGGER.is_match(c.text))
    else {
        return String::new();
    };

    RE_TRIGGER
        .captures_iter(comment.text)
        .map(|caps| {
            let line = caps[1].trim_end();
            line.strip_suffix("*/").unwrap_or(line).trim().to_string()
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

fn captures(re: &Regex, body: &str) -> BTreeSet<String> {
    re.captures_iter(body).map(|c| c[1].to_string()).collect()
}

fn invoked_operations(body: &str, own_name: &str) -> BTreeSet<String> {
    let rte_calls = captures(&RE_RTE_CALL, body);
    let plain = RE_CALL
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .filter(|c| {
            !RESERVED.contains(&c.as_str())
                && !EXCLUDED_CALLS.contains(&c.as_str())
                && !c.starts_with("Rte_")
                && c != own_name
        });

    rte_calls
        .into_iter()
        .chain(plain)
        .filter(|c| !RE_ALL_CAPS.is_match(c))
        .collect()
}

fn used_data_types(body: &str) -> BTreeSet<String> {
    RE_LOCAL_DECL
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .filter(|t| !RESERVED.contains(&t.to_lowercase().as_str()))
        .collect()
}

/// Collapse whitespace runs to single spaces.
fn collapse(text: &str) -> String {
    RE_WS.replace_all(text.trim(), " ").into_owned()
}

/// Collapsed, with pointer stars glued to the type.
fn normalize(text: &str) -> String {
    collapse(text).replace(" *", "*")
}
