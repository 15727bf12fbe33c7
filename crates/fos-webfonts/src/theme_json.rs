//! theme.json Webfonts
//!
//! Reads `settings.typography.fontFamilies[].fontFace[]` declarations.

use serde::Deserialize;
use url::Url;

use crate::descriptor::{PropertyValue, RawWebfont};

/// theme.json read error
#[derive(Debug, thiserror::Error)]
pub enum ThemeJsonError {
    #[error("Invalid theme.json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid font source path: {0}")]
    InvalidSrc(#[from] url::ParseError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeJson {
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    typography: Typography,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Typography {
    font_families: Vec<FontFamily>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FontFamily {
    font_family: Option<String>,
    font_face: Vec<RawWebfont>,
}

/// Collect the font faces declared in a theme.json document.
///
/// Faces default to the `local` provider and to the first family of their
/// family's `fontFamily` stack. `file:./` sources resolve against
/// `theme_root`, which should end with a `/`.
pub fn webfonts_from_theme_json(
    json: &str,
    theme_root: &Url,
) -> Result<Vec<RawWebfont>, ThemeJsonError> {
    let theme: ThemeJson = serde_json::from_str(json)?;

    let mut webfonts = Vec::new();
    for family in theme.settings.typography.font_families {
        for face in family.font_face {
            let mut face = face.into_kebab_case();

            if !face.contains("provider") {
                face.insert("provider", "local");
            }
            if !face.contains("font-family") {
                let inherited = family.font_family.as_deref().and_then(primary_family);
                if let Some(font_family) = inherited {
                    face.insert("font-family", font_family);
                }
            }
            if let Some(src) = face.get("src").cloned() {
                face.insert("src", resolve_src(src, theme_root)?);
            }

            webfonts.push(face);
        }
    }
    Ok(webfonts)
}

/// First family of a CSS font stack, unquoted
fn primary_family(stack: &str) -> Option<&str> {
    let first = stack.split(',').next()?.trim();
    let first = first.trim_matches(|c| c == '"' || c == '\'').trim();
    (!first.is_empty()).then_some(first)
}

fn resolve_src(src: PropertyValue, theme_root: &Url) -> Result<PropertyValue, ThemeJsonError> {
    match src {
        PropertyValue::Text(src) => Ok(PropertyValue::Text(resolve_file(&src, theme_root)?)),
        PropertyValue::List(srcs) => srcs
            .iter()
            .map(|src| resolve_file(src, theme_root))
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::List),
        other => Ok(other),
    }
}

fn resolve_file(src: &str, theme_root: &Url) -> Result<String, ThemeJsonError> {
    match src.strip_prefix("file:./") {
        Some(path) => Ok(theme_root.join(path)?.to_string()),
        None => Ok(src.to_string()),
    }
}
