//! Data model for scanned C sources, independent of output format.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Everything extracted from a single source file.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub source_file: String,
    pub functions: Vec<FunctionRecord>,
    pub macros: Vec<MacroRecord>,
    pub variables: Vec<VariableRecord>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.macros.is_empty() && self.variables.is_empty()
    }
}

/// Syntactic convention a function definition was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// `FUNC(ret, memclass) name(...)`
    Runnable,
    /// `static [inline] ...`
    Static,
    /// Plain `type name(...)` at file scope
    Global,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Runnable => "Runnable",
            Category::Static => "Static",
            Category::Global => "Global",
        };
        f.write_str(s)
    }
}

/// Data-flow direction of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
    #[serde(rename = "INOUT")]
    InOut,
}

impl Direction {
    pub fn is_input(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    pub fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
            Direction::InOut => "INOUT",
        };
        f.write_str(s)
    }
}

/// One parameter of a function definition.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Raw declaration fragment, e.g. `P2VAR(uint8, AUTOMATIC, RTE_VAR) out`
    pub declaration: String,
    pub direction: Direction,
}

/// A discovered function definition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRecord {
    pub name: String,
    pub return_type: String,
    pub syntax: String,
    pub category: Category,
    pub parameters: Vec<Parameter>,
    pub in_params: Vec<String>,
    pub out_params: Vec<String>,
    pub trigger: String,
    pub inputs: BTreeSet<String>,
    pub outputs: BTreeSet<String>,
    pub invoked_operations: BTreeSet<String>,
    pub used_data_types: BTreeSet<String>,
    pub description: String,
    pub line_number: usize,
}

impl FunctionRecord {
    /// Derive the in/out name lists from the classified parameters.
    ///
    /// An INOUT parameter lands in both lists.
    pub fn partition_params(parameters: &[Parameter]) -> (Vec<String>, Vec<String>) {
        let inputs = parameters
            .iter()
            .filter(|p| p.direction.is_input())
            .map(|p| p.name.clone())
            .collect();
        let outputs = parameters
            .iter()
            .filter(|p| p.direction.is_output())
            .map(|p| p.name.clone())
            .collect();
        (inputs, outputs)
    }
}

/// A `#define` directive.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroRecord {
    pub name: String,
    /// Raw `(a, b)` list of a function-like macro
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    pub value: String,
    pub line_number: usize,
}

/// Where a file-scope variable is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scope {
    Extern,
    #[serde(rename = "Static Global")]
    StaticGlobal,
    Global,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scope::Extern => "Extern",
            Scope::StaticGlobal => "Static Global",
            Scope::Global => "Global",
        };
        f.write_str(s)
    }
}

/// A file-scope variable declaration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRecord {
    pub name: String,
    /// Includes the `[size]` suffix for arrays
    pub data_type: String,
    pub initial_value: String,
    pub scope: Scope,
    pub line_number: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, direction: Direction) -> Parameter {
        Parameter {
            name: name.to_string(),
            declaration: format!("uint8* {}", name),
            direction,
        }
    }

    #[test]
    fn inout_lands_in_both_lists() {
        let params = vec![
            param("a", Direction::In),
            param("b", Direction::Out),
            param("c", Direction::InOut),
        ];
        let (ins, outs) = FunctionRecord::partition_params(&params);
        assert_eq!(ins, vec!["a", "c"]);
        assert_eq!(outs, vec!["b", "c"]);
    }

    #[test]
    fn scope_serializes_with_space() {
        let json = serde_json::to_string(&Scope::StaticGlobal).unwrap();
        assert_eq!(json, "\"Static Global\"");
    }

    #[test]
    fn direction_serializes_upper() {
        let json = serde_json::to_string(&Direction::InOut).unwrap();
        assert_eq!(json, "\"INOUT\"");
    }
}
