//! Webfont Schema Validation
//!
//! Checks the required fields of a raw webfont and normalizes everything
//! else against the `@font-face` descriptor allow-list. Bad style, weight
//! or display values are coerced to defaults rather than rejected.

use std::fmt;

use indexmap::IndexMap;

use crate::descriptor::{PropertyValue, RawWebfont, Webfont};

/// `@font-face` descriptors a webfont may carry
pub const VALID_FONT_FACE_PROPERTIES: &[&str] = &[
    "ascent-override",
    "descent-override",
    "font-display",
    "font-family",
    "font-feature-settings",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-variation-settings",
    "font-weight",
    "line-gap-override",
    "size-adjust",
    "src",
    "unicode-range",
];

pub const VALID_FONT_STYLES: &[&str] = &[
    "normal", "italic", "oblique", "inherit", "initial", "revert", "unset",
];

pub const VALID_FONT_WEIGHTS: &[&str] = &["normal", "bold", "bolder", "lighter", "inherit"];

pub const VALID_FONT_DISPLAYS: &[&str] = &["auto", "block", "swap", "fallback"];

pub const DEFAULT_FONT_STYLE: &str = "normal";
pub const DEFAULT_FONT_WEIGHT: &str = "400";
pub const DEFAULT_FONT_DISPLAY: &str = "fallback";

/// Hard schema failures; the webfont cannot be registered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Webfont provider is missing")]
    MissingProvider,

    #[error("Webfont provider must be a non-empty string")]
    InvalidProvider,

    #[error("Webfont font-family is missing")]
    MissingFontFamily,

    #[error("Webfont font-family must be a non-empty string")]
    InvalidFontFamily,
}

/// A change made while normalizing a webfont
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    /// Property is not an `@font-face` descriptor and was dropped
    UnknownProperty { name: String },
    /// Invalid `font-style`, reset to `normal`
    FontStyle { given: PropertyValue },
    /// Invalid `font-weight`, reset to `400`
    FontWeight { given: PropertyValue },
    /// Invalid `font-display`, reset to `fallback`
    FontDisplay { given: PropertyValue },
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::UnknownProperty { name } => {
                write!(f, "dropped unknown property \"{}\"", name)
            }
            Correction::FontStyle { given } => {
                write!(f, "font-style \"{}\" is invalid, using \"{}\"", given, DEFAULT_FONT_STYLE)
            }
            Correction::FontWeight { given } => {
                write!(f, "font-weight \"{}\" is invalid, using \"{}\"", given, DEFAULT_FONT_WEIGHT)
            }
            Correction::FontDisplay { given } => {
                write!(
                    f,
                    "font-display \"{}\" is invalid, using \"{}\"",
                    given, DEFAULT_FONT_DISPLAY
                )
            }
        }
    }
}

/// Normalized webfont plus the corrections applied to it
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub webfont: Webfont,
    pub corrections: Vec<Correction>,
}

/// Webfont schema validator
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check the hard requirements: non-empty text `provider` and `font-family`
    pub fn validate_schema(&self, webfont: &RawWebfont) -> Result<(), SchemaError> {
        required_text(
            webfont,
            "provider",
            SchemaError::MissingProvider,
            SchemaError::InvalidProvider,
        )?;
        required_text(
            webfont,
            "font-family",
            SchemaError::MissingFontFamily,
            SchemaError::InvalidFontFamily,
        )?;
        Ok(())
    }

    /// Like `validate_schema`, logging a warning on failure
    pub fn is_valid_schema(&self, webfont: &RawWebfont) -> bool {
        match self.validate_schema(webfont) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Invalid webfont schema: {}", err);
                false
            }
        }
    }

    /// Merge the webfont over the default template, drop unknown
    /// properties and coerce invalid style, weight and display values.
    pub fn set_valid_properties(&self, webfont: RawWebfont) -> Normalized {
        let mut corrections = Vec::new();

        let mut properties: IndexMap<String, PropertyValue> = IndexMap::new();
        properties.insert("provider".to_string(), PropertyValue::from(""));
        properties.insert("font-family".to_string(), PropertyValue::from(""));
        properties.insert("font-style".to_string(), PropertyValue::from(DEFAULT_FONT_STYLE));
        properties.insert("font-weight".to_string(), PropertyValue::from(DEFAULT_FONT_WEIGHT));
        properties.insert("font-display".to_string(), PropertyValue::from(DEFAULT_FONT_DISPLAY));

        for (name, value) in webfont {
            if name == "provider" || VALID_FONT_FACE_PROPERTIES.contains(&name.as_str()) {
                properties.insert(name, value);
            } else {
                tracing::debug!(property = %name, "Dropping unknown webfont property");
                corrections.push(Correction::UnknownProperty { name });
            }
        }

        trim_text(&mut properties, "provider");
        trim_text(&mut properties, "font-family");

        let style = coerce(&mut properties, "font-style", DEFAULT_FONT_STYLE, style_keyword);
        if let Some(given) = style {
            corrections.push(Correction::FontStyle { given });
        }
        let weight = coerce(&mut properties, "font-weight", DEFAULT_FONT_WEIGHT, weight_keyword);
        if let Some(given) = weight {
            corrections.push(Correction::FontWeight { given });
        }
        let display =
            coerce(&mut properties, "font-display", DEFAULT_FONT_DISPLAY, display_keyword);
        if let Some(given) = display {
            corrections.push(Correction::FontDisplay { given });
        }

        for correction in &corrections {
            if !matches!(correction, Correction::UnknownProperty { .. }) {
                tracing::warn!("Webfont corrected: {}", correction);
            }
        }

        Normalized {
            webfont: Webfont::from_properties(properties),
            corrections,
        }
    }
}

fn required_text(
    webfont: &RawWebfont,
    name: &str,
    missing: SchemaError,
    invalid: SchemaError,
) -> Result<(), SchemaError> {
    match webfont.get(name) {
        None => Err(missing),
        Some(PropertyValue::Text(text)) if !text.trim().is_empty() => Ok(()),
        Some(_) => Err(invalid),
    }
}

fn trim_text(properties: &mut IndexMap<String, PropertyValue>, name: &str) {
    if let Some(PropertyValue::Text(text)) = properties.get_mut(name) {
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }
}

/// Replace the property with its canonical text form, or with `default`
/// when it is invalid. Returns the rejected value.
fn coerce(
    properties: &mut IndexMap<String, PropertyValue>,
    name: &str,
    default: &str,
    canonical: fn(&PropertyValue) -> Option<String>,
) -> Option<PropertyValue> {
    let value = properties.get_mut(name)?;
    match canonical(value) {
        Some(text) => {
            *value = PropertyValue::Text(text);
            None
        }
        None => Some(std::mem::replace(value, PropertyValue::from(default))),
    }
}

fn style_keyword(value: &PropertyValue) -> Option<String> {
    let style = value.as_text()?.trim();
    (VALID_FONT_STYLES.contains(&style) || is_oblique_angle(style)).then(|| style.to_string())
}

fn weight_keyword(value: &PropertyValue) -> Option<String> {
    let weight = match value {
        PropertyValue::Text(text) => text.trim().to_string(),
        // theme.json commonly writes weights as numbers
        PropertyValue::Number(number) if number.fract() == 0.0 && *number >= 0.0 => {
            format!("{}", *number as u64)
        }
        _ => return None,
    };

    let valid = VALID_FONT_WEIGHTS.contains(&weight.as_str()) || {
        let parts: Vec<&str> = weight.split_whitespace().collect();
        matches!(parts.len(), 1 | 2) && parts.iter().all(|part| is_integer(part))
    };
    valid.then_some(weight)
}

fn display_keyword(value: &PropertyValue) -> Option<String> {
    let display = value.as_text()?.trim();
    VALID_FONT_DISPLAYS.contains(&display).then(|| display.to_string())
}

/// `oblique <number>%`
fn is_oblique_angle(style: &str) -> bool {
    let Some(rest) = style.strip_prefix("oblique") else {
        return false;
    };
    if !rest.starts_with(char::is_whitespace) {
        return false;
    }
    let Some(angle) = rest.trim_start().strip_suffix('%') else {
        return false;
    };

    let digits = angle.strip_prefix(['-', '+']).unwrap_or(angle);
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();
    let whole_ok = !whole.is_empty() && is_integer(whole);
    match fraction {
        None => whole_ok,
        Some(fraction) => {
            (whole_ok || whole.is_empty()) && !fraction.is_empty() && is_integer(fraction)
        }
    }
}

fn is_integer(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
