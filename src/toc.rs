//! GitHub-flavored markdown anchors for the document index.

use std::collections::HashMap;

/// Hands out heading anchors in document order.
///
/// GitHub disambiguates repeated headings by appending `-1`, `-2`, ... to
/// the slug; the slugger must see every heading in the same order the
/// renderer emits them.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor for the next heading with text `text`.
    pub fn slug(&mut self, text: &str) -> String {
        let base = github_slug(text);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        slug
    }
}

/// Index list item linking to an anchor.
pub fn render_toc_item(title: &str, anchor: &str) -> String {
    format!("* [{}](#{})", title, anchor)
}

/// GitHub heading anchor slug generation.
///
/// - lowercase
/// - keep alphanumerics, spaces, underscores and hyphens
/// - replace spaces with hyphens
fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}
