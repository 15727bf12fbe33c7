//! Webfont Providers
//!
//! A provider turns the webfonts routed to it into CSS and preconnect hints
//! for one font source.

mod google;
mod local;

use std::fmt;

use indexmap::IndexMap;
use url::{Position, Url};

use crate::descriptor::Webfonts;

pub use google::{GoogleProvider, GOOGLE_FONTS_API_URL};
pub use local::LocalProvider;

/// Pluggable webfont provider
pub trait WebfontsProvider: fmt::Debug + Send {
    /// Identifier webfonts use in their `provider` property
    fn id(&self) -> &str;

    /// Hand the provider the webfonts it should render
    fn set_webfonts(&mut self, webfonts: Webfonts);

    fn webfonts(&self) -> &Webfonts;

    /// Hosts the page should open a connection to early
    fn preconnect_links(&self) -> Vec<PreconnectLink> {
        Vec::new()
    }

    /// Remote stylesheets to import ahead of the generated CSS
    fn remote_stylesheets(&self) -> Vec<Url> {
        Vec::new()
    }

    /// `@font-face` CSS for the current webfonts
    fn get_css(&self) -> String;
}

/// Preconnect link attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    /// `true` renders the bare attribute, `false` omits it
    Flag(bool),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

/// `<link rel="preconnect">` resource hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconnectLink {
    attributes: IndexMap<String, AttributeValue>,
}

impl PreconnectLink {
    pub fn new(href: &str) -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert("href".to_string(), AttributeValue::from(href));
        Self { attributes }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn crossorigin(self, enabled: bool) -> Self {
        self.with_attribute("crossorigin", enabled)
    }

    pub fn href(&self) -> Option<&str> {
        match self.attributes.get("href") {
            Some(AttributeValue::Text(href)) => Some(href),
            _ => None,
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Render the link tag. `None` when the href is missing, empty or
    /// cannot be read as a URL reference.
    pub fn render(&self) -> Option<String> {
        let href = escaped_href(self.href()?)?;

        let mut tag = String::from("<link rel=\"preconnect\"");
        for (name, value) in &self.attributes {
            match (name.as_str(), value) {
                ("rel", _) => {}
                ("href", _) => push_attribute(&mut tag, "href", &href),
                (_, AttributeValue::Text(text)) => push_attribute(&mut tag, name, text),
                (_, AttributeValue::Flag(true)) => {
                    tag.push(' ');
                    tag.push_str(name);
                }
                (_, AttributeValue::Flag(false)) => {}
            }
        }
        tag.push('>');
        Some(tag)
    }
}

const REFERENCE_BASE: &str = "https://reference.invalid/";

/// Percent-encoded href. Absolute URLs are serialized as they are; protocol
/// and root relative references are resolved against a throwaway origin and
/// cut back to their relative form.
fn escaped_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match Url::parse(href) {
        Ok(url) => Some(url.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let url = Url::parse(REFERENCE_BASE).ok()?.join(href).ok()?;
            let path = &url[Position::BeforePath..];
            let escaped = if href.starts_with("//") {
                format!("//{}", &url[Position::BeforeUsername..])
            } else if href.starts_with('/') {
                path.to_string()
            } else {
                path.strip_prefix('/').unwrap_or(path).to_string()
            };
            Some(escaped)
        }
        Err(_) => None,
    }
}

fn push_attribute(tag: &mut String, name: &str, value: &str) {
    tag.push(' ');
    tag.push_str(name);
    tag.push_str("=\"");
    escape_attribute(value, tag);
    tag.push('"');
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#039;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Font family as a quoted CSS string
pub(crate) fn css_family_name(family: &str) -> String {
    format!("\"{}\"", unquoted_family(family).replace('"', "\\\""))
}

/// Font family with surrounding quotes removed
pub(crate) fn unquoted_family(family: &str) -> &str {
    family.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_crossorigin() {
        let link = PreconnectLink::new("https://fonts.gstatic.com").crossorigin(true);
        assert_eq!(
            link.render().unwrap(),
            r#"<link rel="preconnect" href="https://fonts.gstatic.com/" crossorigin>"#
        );
    }

    #[test]
    fn test_render_false_flag_omitted() {
        let link = PreconnectLink::new("https://fonts.googleapis.com").crossorigin(false);
        assert_eq!(
            link.render().unwrap(),
            r#"<link rel="preconnect" href="https://fonts.googleapis.com/">"#
        );
    }

    #[test]
    fn test_render_escapes() {
        let link = PreconnectLink::new("https://cdn.example.com/a b?x=\"1\"")
            .with_attribute("data-note", "<fonts & more>");
        let tag = link.render().unwrap();

        assert!(tag.contains(r#"href="https://cdn.example.com/a%20b?x=%221%22""#), "{}", tag);
        assert!(tag.contains(r#"data-note="&lt;fonts &amp; more&gt;""#), "{}", tag);
    }

    #[test]
    fn test_render_protocol_relative() {
        assert_eq!(
            PreconnectLink::new("//fonts.example.com").crossorigin(true).render().unwrap(),
            r#"<link rel="preconnect" href="//fonts.example.com/" crossorigin>"#
        );
    }

    #[test]
    fn test_render_relative_escaped() {
        let href = |href: &str| {
            let tag = PreconnectLink::new(href).render().unwrap();
            tag["<link rel=\"preconnect\" href=\"".len()..tag.len() - 2].to_string()
        };

        assert_eq!(href("/fonts"), "/fonts");
        assert_eq!(href("/my fonts/?q=\"a\""), "/my%20fonts/?q=%22a%22");
        assert_eq!(href("fonts/a b"), "fonts/a%20b");
    }

    #[test]
    fn test_render_invalid_href() {
        assert!(PreconnectLink::new("").render().is_none());
        assert!(PreconnectLink::new("  ").render().is_none());
        assert!(PreconnectLink::new("https://exa mple.com").render().is_none());
        assert!(
            PreconnectLink::new("https://example.com")
                .with_attribute("href", true)
                .render()
                .is_none()
        );
    }

    #[test]
    fn test_rel_cannot_be_overridden() {
        let tag = PreconnectLink::new("https://example.com")
            .with_attribute("rel", "stylesheet")
            .render()
            .unwrap();
        assert_eq!(tag, r#"<link rel="preconnect" href="https://example.com/">"#);
    }

    #[test]
    fn test_family_quoting() {
        assert_eq!(css_family_name("Open Sans"), "\"Open Sans\"");
        assert_eq!(css_family_name("\"Open Sans\""), "\"Open Sans\"");
        assert_eq!(css_family_name("'Lora'"), "\"Lora\"");
    }
}
