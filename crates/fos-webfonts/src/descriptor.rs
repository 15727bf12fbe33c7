//! Webfont Descriptors
//!
//! Raw and normalized `@font-face` descriptors, registration keys and the
//! name conversions used to build them.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Registered webfonts keyed by registration key, in insertion order
pub type Webfonts = IndexMap<WebfontKey, Webfont>;

/// Value of a single descriptor property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Source lists (`src`)
    List(Vec<String>),
    /// Variation axes (`font-variation-settings`)
    Axes(IndexMap<String, f64>),
}

impl PropertyValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is a text value with nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.as_text().is_some_and(|text| text.trim().is_empty())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(text) => f.write_str(text),
            PropertyValue::Number(number) => f.write_str(&format_number(*number)),
            PropertyValue::Bool(flag) => write!(f, "{}", flag),
            PropertyValue::List(items) => f.write_str(&items.join(", ")),
            PropertyValue::Axes(axes) => {
                let settings: Vec<String> = axes
                    .iter()
                    .map(|(axis, value)| format!("\"{}\" {}", axis, format_number(*value)))
                    .collect();
                f.write_str(&settings.join(", "))
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

impl From<&[&str]> for PropertyValue {
    fn from(value: &[&str]) -> Self {
        PropertyValue::List(value.iter().map(|item| item.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PropertyValue {
    fn from(value: [&str; N]) -> Self {
        PropertyValue::from(&value[..])
    }
}

/// Format a number the way CSS expects (no trailing `.0`)
fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

/// Webfont descriptor as supplied by callers, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawWebfont(IndexMap<String, PropertyValue>);

impl RawWebfont {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Rewrite every property name to hyphenated lowercase.
    ///
    /// When two names collapse to the same form, the later value wins and
    /// keeps the earlier position.
    pub fn into_kebab_case(self) -> Self {
        self.0
            .into_iter()
            .map(|(name, value)| (to_kebab_case(&name), value))
            .collect()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for RawWebfont {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = IndexMap::new();
        for (name, value) in iter {
            map.insert(name.into(), value.into());
        }
        RawWebfont(map)
    }
}

impl IntoIterator for RawWebfont {
    type Item = (String, PropertyValue);
    type IntoIter = indexmap::map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Normalized webfont descriptor.
///
/// Only built by the schema validator, so `provider`, `font-family`,
/// `font-style`, `font-weight` and `font-display` are always text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Webfont {
    properties: IndexMap<String, PropertyValue>,
}

impl Webfont {
    pub(crate) fn from_properties(properties: IndexMap<String, PropertyValue>) -> Self {
        Self { properties }
    }

    pub fn provider(&self) -> &str {
        self.text("provider")
    }

    pub fn font_family(&self) -> &str {
        self.text("font-family")
    }

    pub fn font_style(&self) -> &str {
        self.text("font-style")
    }

    pub fn font_weight(&self) -> &str {
        self.text("font-weight")
    }

    pub fn font_display(&self) -> &str {
        self.text("font-display")
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Properties in descriptor order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Slug of the font family, used by the family index
    pub fn family_slug(&self) -> String {
        family_slug(self.font_family())
    }

    /// Registration key for this webfont
    pub fn key(&self) -> WebfontKey {
        WebfontKey::new(self.font_family(), self.font_style(), self.font_weight())
    }

    /// Convert back into a raw descriptor
    pub fn to_raw(&self) -> RawWebfont {
        RawWebfont(self.properties.clone())
    }

    fn text(&self, name: &str) -> &str {
        self.properties
            .get(name)
            .and_then(PropertyValue::as_text)
            .unwrap_or_default()
    }
}

/// Registration key: `{family-slug}.{font-style}.{font-weight}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WebfontKey(String);

impl WebfontKey {
    pub fn new(font_family: &str, font_style: &str, font_weight: &str) -> Self {
        WebfontKey(format!(
            "{}.{}.{}",
            family_slug(font_family),
            font_style.trim(),
            font_weight.trim()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WebfontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for WebfontKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for WebfontKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for WebfontKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WebfontKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Convert a property name to hyphenated lowercase.
///
/// `fontFamily`, `font_family`, `FontFamily` and `font-family` all become
/// `font-family`; acronyms split before their last capital (`URLPath` is
/// `url-path`).
pub fn to_kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join("-")
}

/// Slugify a font family: lowercase, runs of non-alphanumerics become a
/// single hyphen, no leading or trailing hyphens.
pub fn family_slug(family: &str) -> String {
    let mut slug = String::with_capacity(family.len());
    let mut pending_hyphen = false;

    for c in family.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
