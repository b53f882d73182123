//! GitHub-flavored markdown renderer.
//!
//! Layout: a title, an index of function anchors, then one `| Field | Value |`
//! table per function, macro and variable under `# Functions`, `# Macros`
//! and `# Variables`. Only the selected fields become rows; the name is the
//! table's heading rather than a row.

use crate::config::FieldSelection;
use crate::model::*;
use crate::render::Renderer;
use crate::toc::{self, Slugger};
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

pub struct MarkdownRenderer {
    fields: FieldSelection,
}

impl MarkdownRenderer {
    pub fn new(fields: FieldSelection) -> Self {
        Self { fields }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, doc: &Document) -> Result<String> {
        let file_name = Path::new(&doc.source_file)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| doc.source_file.clone());
        let title = format!("Documentation: {}", file_name);

        let mut slugger = Slugger::new();
        slugger.slug(&title);

        let has_index = !doc.functions.is_empty();
        if has_index {
            slugger.slug("Index");
        }

        let mut body: Vec<String> = Vec::new();
        let mut anchors: Vec<(&str, String)> = Vec::new();

        if !doc.functions.is_empty() {
            section(&mut body, &mut slugger, "Functions");
            for func in &doc.functions {
                anchors.push((func.name.as_str(), slugger.slug(&func.name)));
                let rows = self
                    .fields
                    .functions
                    .iter()
                    .filter_map(|label| function_field(func, label).map(|v| (*label, v)));
                table(&mut body, &func.name, rows);
            }
        }

        if !doc.macros.is_empty() {
            section(&mut body, &mut slugger, "Macros");
            for mac in &doc.macros {
                slugger.slug(&mac.name);
                let rows = self
                    .fields
                    .macros
                    .iter()
                    .filter_map(|label| macro_field(mac, label).map(|v| (*label, v)));
                table(&mut body, &mac.name, rows);
            }
        }

        if !doc.variables.is_empty() {
            section(&mut body, &mut slugger, "Variables");
            for var in &doc.variables {
                slugger.slug(&var.name);
                let rows = self
                    .fields
                    .variables
                    .iter()
                    .filter_map(|label| variable_field(var, label).map(|v| (*label, v)));
                table(&mut body, &var.name, rows);
            }
        }

        let mut output = format!("# {}\n\n", title);
        if has_index {
            output.push_str("## Index\n\n");
            for (name, anchor) in &anchors {
                output.push_str(&toc::render_toc_item(name, anchor));
                output.push('\n');
            }
            output.push('\n');
        }
        output.push_str(&body.join("\n"));
        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

fn section(body: &mut Vec<String>, slugger: &mut Slugger, heading: &str) {
    slugger.slug(heading);
    body.push(format!("# {}\n", heading));
}

/// `## name` followed by a two-column table. Nothing but the heading when
/// no rows are selected.
fn table<'a>(body: &mut Vec<String>, name: &str, rows: impl Iterator<Item = (&'a str, String)>) {
    body.push(format!("## {}\n", name));
    let rows: Vec<String> = rows
        .map(|(label, value)| format!("| {} | {} |", label, escape_cell(&value)))
        .collect();
    if !rows.is_empty() {
        body.push("| Field | Value |".to_string());
        body.push("|-------|-------|".to_string());
        body.extend(rows);
    }
    body.push(String::new());
}

/// Cell text for a function field. `Name` is the heading, not a row.
fn function_field(func: &FunctionRecord, label: &str) -> Option<String> {
    let value = match label {
        "Syntax" => code(&func.syntax),
        "Return Value" => code(&func.return_type),
        "In-Parameters" => func.in_params.join(", "),
        "Out-Parameters" => func.out_params.join(", "),
        "Function Type" => func.category.to_string(),
        "Description" => func.description.clone(),
        // Placeholder columns, never derived from source.
        "Sync/Async" | "Reentrancy" => String::new(),
        "Triggers" => func.trigger.clone(),
        "Inputs" => join_set(&func.inputs),
        "Outputs" => join_set(&func.outputs),
        "Invoked Operations" => join_set(&func.invoked_operations),
        "Used Data Types" => join_set(&func.used_data_types),
        "Line" => func.line_number.to_string(),
        _ => return None,
    };
    Some(value)
}

fn macro_field(mac: &MacroRecord, label: &str) -> Option<String> {
    let value = match label {
        "Parameters" => mac.parameters.clone().unwrap_or_default(),
        "Value" => code(&mac.value),
        "Line" => mac.line_number.to_string(),
        _ => return None,
    };
    Some(value)
}

fn variable_field(var: &VariableRecord, label: &str) -> Option<String> {
    let value = match label {
        "Data Type" => code(&var.data_type),
        "Initial Value" => code(&var.initial_value),
        "Scope" => var.scope.to_string(),
        "Line" => var.line_number.to_string(),
        _ => return None,
    };
    Some(value)
}

fn join_set(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Inline code span; empty text stays empty.
fn code(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("`{}`", text)
    }
}

/// Keep a value on one table row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace("\r\n", "<br>").replace('\n', "<br>")
}
