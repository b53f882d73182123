//! Renderer module: trait-based format dispatch.

pub mod json;
pub mod markdown;

use crate::config::{FieldSelection, Format};
use crate::model::Document;
use anyhow::{bail, Result};

/// Trait for rendering a Document into a specific output format.
pub trait Renderer {
    fn render(&self, doc: &Document) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format.
///
/// Spreadsheet and Word output are recognized but have no writer in this
/// tool; asking for them fails for that format only.
pub fn create_renderer(format: Format, fields: &FieldSelection) -> Result<Box<dyn Renderer>> {
    match format {
        Format::Markdown => Ok(Box::new(markdown::MarkdownRenderer::new(fields.clone()))),
        Format::Json => Ok(Box::new(json::JsonRenderer)),
        Format::Excel | Format::Word => bail!("no {} writer is available", format),
    }
}
