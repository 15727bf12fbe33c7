//! Local Provider
//!
//! Self-hosted fonts rendered as `@font-face` rules.

use url::{Position, Url};

use super::{css_family_name, WebfontsProvider};
use crate::descriptor::{PropertyValue, Webfont, Webfonts};

/// Font source formats, in the order browsers should try them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SrcFormat {
    Data,
    Woff2,
    Woff,
    TrueType,
    OpenType,
    EmbeddedOpenType,
    Svg,
}

impl SrcFormat {
    fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("data:") {
            return Some(SrcFormat::Data);
        }

        let path = url.split(['?', '#']).next().unwrap_or(url);
        let file = path.rsplit('/').next().unwrap_or(path);
        let (_, extension) = file.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "woff2" => Some(SrcFormat::Woff2),
            "woff" => Some(SrcFormat::Woff),
            "ttf" => Some(SrcFormat::TrueType),
            "otf" => Some(SrcFormat::OpenType),
            "eot" => Some(SrcFormat::EmbeddedOpenType),
            "svg" => Some(SrcFormat::Svg),
            _ => None,
        }
    }

    fn css_name(self) -> &'static str {
        match self {
            SrcFormat::Data => "data",
            SrcFormat::Woff2 => "woff2",
            SrcFormat::Woff => "woff",
            SrcFormat::TrueType => "truetype",
            SrcFormat::OpenType => "opentype",
            SrcFormat::EmbeddedOpenType => "embedded-opentype",
            SrcFormat::Svg => "svg",
        }
    }
}

/// Provider for fonts served from the site itself
#[derive(Debug, Default)]
pub struct LocalProvider {
    webfonts: Webfonts,
    site_url: Option<Url>,
}

impl LocalProvider {
    pub const ID: &'static str = "local";

    pub fn new() -> Self {
        Self::default()
    }

    /// URLs on this origin are emitted root-relative
    pub fn with_site_url(mut self, site_url: Url) -> Self {
        self.site_url = Some(site_url);
        self
    }

    fn build_font_face_css(&self, webfont: &Webfont) -> String {
        let family = css_family_name(webfont.font_family());

        let mut css = String::from("@font-face{");
        for (name, value) in webfont.iter() {
            let value = match name {
                "provider" => continue,
                "font-family" => family.clone(),
                "src" => self.compile_src(&family, value),
                _ => value.to_string(),
            };
            if value.trim().is_empty() {
                continue;
            }
            css.push_str(name);
            css.push(':');
            css.push_str(&value);
            css.push(';');
        }
        css.push('}');
        css
    }

    fn compile_src(&self, family: &str, value: &PropertyValue) -> String {
        let urls: Vec<&str> = match value {
            PropertyValue::Text(src) => vec![src.trim()],
            PropertyValue::List(srcs) => srcs.iter().map(|src| src.trim()).collect(),
            _ => Vec::new(),
        };

        let mut sources: Vec<(SrcFormat, &str)> = urls
            .into_iter()
            .filter_map(|url| match SrcFormat::from_url(url) {
                Some(format) => Some((format, url)),
                None => {
                    tracing::debug!(src = %url, "Skipping webfont source with unknown format");
                    None
                }
            })
            .collect();
        sources.sort_by_key(|(format, _)| *format);

        let mut src = format!("local({})", family);
        for (format, url) in sources {
            if format == SrcFormat::Data {
                src.push_str(&format!(", url({})", url));
            } else {
                let url = self.relative_url(url).replace('\'', "%27");
                src.push_str(&format!(", url('{}') format('{}')", url, format.css_name()));
            }
        }
        src
    }

    fn relative_url(&self, url: &str) -> String {
        let Some(site_url) = &self.site_url else {
            return url.to_string();
        };
        match Url::parse(url) {
            Ok(parsed) if parsed.origin() == site_url.origin() => {
                parsed[Position::BeforePath..].to_string()
            }
            _ => url.to_string(),
        }
    }
}

impl WebfontsProvider for LocalProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    fn set_webfonts(&mut self, webfonts: Webfonts) {
        self.webfonts = webfonts;
    }

    fn webfonts(&self) -> &Webfonts {
        &self.webfonts
    }

    fn get_css(&self) -> String {
        let mut css = String::new();
        for webfont in self.webfonts.values() {
            css.push_str(&self.build_font_face_css(webfont));
            css.push('\n');
        }
        css
    }
}
