//! Heuristic IN / OUT / INOUT detection for function parameters.
//!
//! A parameter is "written" or "read" when one of a fixed set of textual
//! usage patterns hits in the function body. This is a documentation aid, not
//! a data-flow analysis: no aliasing, no control flow, no call graph.

use super::balance::find_balanced;
use crate::model::Direction;
use regex::Regex;
use std::sync::LazyLock;

static RE_CONST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bconst\b").unwrap());

static RE_P2CONST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*P2CONST\s*\(").unwrap());

static RE_P2VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*P2VAR\s*\(").unwrap());

static RE_CONDITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:if|while|for|switch)\s*\(").unwrap());

/// Assignment operator, plain or compound, but not `==`.
const ASSIGN: &str = r"(?:[+\-*/%&|^]|<<|>>)?=(?:[^=]|$)";

/// Patterns that mean the parameter (or what it points to) is modified.
const WRITE_PATTERNS: &[&str] = &[
    // *p = x
    r"\*\s*{p}\b\s*{assign}",
    // p[i] = x
    r"\b{p}\s*\[[^\]]*\]\s*{assign}",
    // p->f = x, p->f.g = x, p->f[i] = x
    r"\b{p}\s*->\s*\w+(?:\s*(?:\.|->)\s*\w+|\s*\[[^\]]*\])*\s*{assign}",
    // ++p, --*p, ++(*p)
    r"(?:\+\+|--)\s*\(?\s*\*?\s*{p}\b",
    // p++, p[i]--, p->f++
    r"\b{p}\s*(?:\[[^\]]*\]\s*|->\s*\w+\s*)?(?:\+\+|--)",
    // (*p) = x, (*p).f = x, (*p)++
    r"\(\s*\*\s*{p}\s*\)\s*(?:\.\s*\w+\s*)*(?:{assign}|\+\+|--)",
    // destination argument of memory/string primitives
    r"\b(?:memcpy|memmove|memset|strcpy|strncpy|sprintf|snprintf)\s*\(\s*(?:\([^()]*\)\s*)?&?\s*\(?\s*\*?\s*{p}\b",
    // argument of a *Write* / *Set* call
    r"\b\w*(?:Write|Set)\w*\s*\([^;]*\b{p}\b",
];

/// Patterns that mean the parameter's value is consumed.
const READ_PATTERNS: &[&str] = &[
    // x = *p, x += *p, f(a, *p), return *p
    r"(?:[^=!<>]=|,|\breturn)\s*\*\s*{p}\b",
    // source argument of memory/string primitives
    r"\b(?:memcpy|memmove|strcpy|strncpy|strcmp|strncmp|memcmp)\s*\([^;]*?,\s*(?:\([^()]*\)\s*)?&?\s*\(?\s*\*?\s*{p}\b",
    // either side of a comparison primitive
    r"\b(?:strcmp|strncmp|memcmp)\s*\(\s*(?:\([^()]*\)\s*)?&?\s*\(?\s*\*?\s*{p}\b",
    // argument of a *Read* / *Get* call
    r"\b\w*(?:Read|Get)\w*\s*\([^;]*\b{p}\b",
    // left operand of a binary operator
    r"\b{p}\b\s*(?:\+[^+=]|-[^\->=]|\*[^=]|/[^=/*]|%[^=]|==|!=|<=|>=|<[^<=]|>[^>=]|&&|\|\||&[^&=]|\|[^|=]|\^[^=]|<<[^=]|>>[^=])",
    // right operand of an unambiguous binary operator, or logical not
    r"(?:[/%^|<]|[^\-]>|==|!=|<=|>=|&&|\|\||!)\s*\*?\s*{p}\b",
];

/// Element or member accesses; a read unless plainly assigned to.
const ACCESS_PATTERNS: &[&str] = &[
    r"\b{p}\s*\[[^\]]*\]",
    r"\b{p}\s*->\s*\w+(?:\s*(?:\.|->)\s*\w+|\s*\[[^\]]*\])*",
];

/// `a + p`, `a * p`, `a - *p`: only binary when a real operand precedes.
const OPERAND_BEFORE: &str = r"(\w+|\])\s*[+\-*&]\s*\*?\s*{p}\b";

/// Words that turn a following `*`/`&`/`-` into a unary operator.
const UNARY_CONTEXT: &[&str] = &["else", "do", "case", "sizeof"];

/// Classify one parameter from its usage in `code` (comments already removed).
///
/// `type_fragment` is the declaration without the parameter name; a `const`
/// qualifier anywhere in it short-circuits to IN.
pub fn classify(code: &str, name: &str, type_fragment: &str) -> Result<Direction, regex::Error> {
    if RE_CONST.is_match(type_fragment) {
        return Ok(Direction::In);
    }

    let escaped = regex::escape(name);
    let written = is_written(code, &escaped)?;
    let read = is_read(code, name, &escaped)?;

    Ok(match (written, read) {
        (true, true) => Direction::InOut,
        (true, false) => Direction::Out,
        // Unused parameters are assumed to be inputs
        _ => Direction::In,
    })
}

/// AUTOSAR pointer macros state the intent explicitly and win over usage.
pub fn macro_override(declaration: &str) -> Option<Direction> {
    if RE_P2CONST.is_match(declaration) {
        Some(Direction::In)
    } else if RE_P2VAR.is_match(declaration) {
        Some(Direction::Out)
    } else {
        None
    }
}

fn build(template: &str, escaped: &str) -> Result<Regex, regex::Error> {
    Regex::new(&template.replace("{assign}", ASSIGN).replace("{p}", escaped))
}

fn is_written(code: &str, escaped: &str) -> Result<bool, regex::Error> {
    for template in WRITE_PATTERNS {
        if build(template, escaped)?.is_match(code) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_read(code: &str, name: &str, escaped: &str) -> Result<bool, regex::Error> {
    for template in READ_PATTERNS {
        if build(template, escaped)?.is_match(code) {
            return Ok(true);
        }
    }

    for template in ACCESS_PATTERNS {
        let re = build(template, escaped)?;
        if re
            .find_iter(code)
            .any(|m| !is_plain_assignment(&code[m.end()..]))
        {
            return Ok(true);
        }
    }

    let operand = build(OPERAND_BEFORE, escaped)?;
    if operand
        .captures_iter(code)
        .any(|caps| !UNARY_CONTEXT.contains(&&caps[1]))
    {
        return Ok(true);
    }

    used_in_condition(code, name)
}

/// `true` when `rest` starts with `=` but not `==`.
fn is_plain_assignment(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.starts_with('=') && !rest.starts_with("==")
}

/// Does the name appear inside an `if`/`while`/`for`/`switch` condition?
fn used_in_condition(code: &str, name: &str) -> Result<bool, regex::Error> {
    let word = Regex::new(&format!(r"\b{}\b", regex::escape(name)))?;
    for m in RE_CONDITION.find_iter(code) {
        let open = m.end() - 1;
        if let Ok(close) = find_balanced(code, open, b'(', b')') {
            if word.is_match(&code[open + 1..close]) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
