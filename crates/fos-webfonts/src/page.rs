//! Host Page
//!
//! Where generated styles and head markup end up.

use indexmap::IndexMap;

/// Page the webfont output is attached to
pub trait StyleHost {
    /// Attach inline CSS to the stylesheet registered under `handle`
    fn add_inline_style(&mut self, handle: &str, css: &str);

    /// Print markup into the document head
    fn print_head(&mut self, html: &str);
}

/// When styles are generated relative to the document head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPhase {
    /// Head not printed yet
    #[default]
    Head,
    /// Head already printed; styles go to the footer
    Footer,
}

/// In-memory page recording everything attached to it
#[derive(Debug, Clone, Default)]
pub struct InMemoryPage {
    inline_styles: IndexMap<String, Vec<String>>,
    head: String,
}

impl InMemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inline styles attached to a handle, in order
    pub fn inline_styles(&self, handle: &str) -> &[String] {
        self.inline_styles
            .get(handle)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All inline styles of a handle joined as one stylesheet
    pub fn stylesheet(&self, handle: &str) -> String {
        self.inline_styles(handle).join("\n")
    }

    /// Handles with inline styles
    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.inline_styles.keys().map(String::as_str)
    }

    pub fn head(&self) -> &str {
        &self.head
    }
}

impl StyleHost for InMemoryPage {
    fn add_inline_style(&mut self, handle: &str, css: &str) {
        self.inline_styles
            .entry(handle.to_string())
            .or_default()
            .push(css.to_string());
    }

    fn print_head(&mut self, html: &str) {
        self.head.push_str(html);
    }
}
