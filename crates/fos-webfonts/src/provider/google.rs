//! Google Fonts Provider
//!
//! Webfonts served by the Google Fonts CSS2 API. The generated CSS imports
//! the API stylesheets; no font data is fetched here.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use url::Url;

use super::{unquoted_family, PreconnectLink, WebfontsProvider};
use crate::descriptor::{Webfont, Webfonts};

pub const GOOGLE_FONTS_API_URL: &str = "https://fonts.googleapis.com/css2";

/// Longest API URL emitted before families spill into another URL
const MAX_URL_LENGTH: usize = 2000;

/// `(ital, weight start, weight end)`
type Variant = (u8, u16, u16);

/// Provider for the Google Fonts API
#[derive(Debug)]
pub struct GoogleProvider {
    webfonts: Webfonts,
    api_url: String,
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::with_api_url(GOOGLE_FONTS_API_URL)
    }
}

impl GoogleProvider {
    pub const ID: &'static str = "google";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            webfonts: Webfonts::new(),
            api_url: api_url.to_string(),
        }
    }

    /// Families and their variants, grouped by `font-display`
    fn families_by_display(&self) -> IndexMap<&str, IndexMap<&str, BTreeSet<Variant>>> {
        let mut groups: IndexMap<&str, IndexMap<&str, BTreeSet<Variant>>> = IndexMap::new();
        for webfont in self.webfonts.values() {
            let variants = groups
                .entry(webfont.font_display())
                .or_default()
                .entry(unquoted_family(webfont.font_family()))
                .or_default();
            match variant(webfont) {
                Some(variant) => {
                    variants.insert(variant);
                }
                None => tracing::debug!(
                    weight = %webfont.font_weight(),
                    "Google Fonts has no variant for this weight"
                ),
            }
        }
        groups
    }
}

fn variant(webfont: &Webfont) -> Option<Variant> {
    let ital = match webfont.font_style() {
        "italic" => 1,
        style if style.starts_with("oblique") => 1,
        _ => 0,
    };

    let weight = webfont.font_weight();
    let (start, end) = match weight {
        "normal" => (400, 400),
        "bold" => (700, 700),
        _ => {
            let mut parts = weight.split_whitespace().map(|part| part.parse::<u16>());
            match (parts.next(), parts.next()) {
                (Some(Ok(weight)), None) => (weight, weight),
                (Some(Ok(start)), Some(Ok(end))) => (start.min(end), start.max(end)),
                _ => return None,
            }
        }
    };
    Some((ital, start, end))
}

/// `Family:ital,wght@0,400;1,200..900`
fn family_param(family: &str, variants: &BTreeSet<Variant>) -> String {
    if variants.is_empty() {
        return family.to_string();
    }

    let tuples: Vec<String> = variants
        .iter()
        .map(|&(ital, start, end)| {
            if start == end {
                format!("{},{}", ital, start)
            } else {
                format!("{},{}..{}", ital, start, end)
            }
        })
        .collect();
    format!("{}:ital,wght@{}", family, tuples.join(";"))
}

fn with_display(url: &Url, display: &str) -> Url {
    let mut url = url.clone();
    url.query_pairs_mut().append_pair("display", display);
    url
}

impl WebfontsProvider for GoogleProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    fn set_webfonts(&mut self, webfonts: Webfonts) {
        self.webfonts = webfonts;
    }

    fn webfonts(&self) -> &Webfonts {
        &self.webfonts
    }

    fn preconnect_links(&self) -> Vec<PreconnectLink> {
        vec![
            PreconnectLink::new("https://fonts.gstatic.com").crossorigin(true),
            PreconnectLink::new("https://fonts.googleapis.com").crossorigin(false),
        ]
    }

    fn remote_stylesheets(&self) -> Vec<Url> {
        if self.webfonts.is_empty() {
            return Vec::new();
        }

        let base = match Url::parse(&self.api_url) {
            Ok(base) => base,
            Err(err) => {
                tracing::warn!(url = %self.api_url, "Invalid Google Fonts API URL: {}", err);
                return Vec::new();
            }
        };

        let mut urls = Vec::new();
        for (display, families) in self.families_by_display() {
            let mut url = base.clone();
            let mut has_families = false;

            for (family, variants) in &families {
                let param = family_param(family, variants);

                let mut candidate = url.clone();
                candidate.query_pairs_mut().append_pair("family", &param);

                let too_long = with_display(&candidate, display).as_str().len() > MAX_URL_LENGTH;
                if has_families && too_long {
                    urls.push(with_display(&url, display));
                    url = base.clone();
                    url.query_pairs_mut().append_pair("family", &param);
                } else {
                    url = candidate;
                }
                has_families = true;
            }

            if has_families {
                urls.push(with_display(&url, display));
            }
        }
        urls
    }

    /// Styles come from `remote_stylesheets`
    fn get_css(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RawWebfont;
    use crate::schema::SchemaValidator;

    fn provider_with(raws: Vec<RawWebfont>) -> GoogleProvider {
        let validator = SchemaValidator::new();
        let mut provider = GoogleProvider::new();
        provider.set_webfonts(
            raws.into_iter()
                .map(|raw| {
                    let webfont = validator.set_valid_properties(raw).webfont;
                    (webfont.key(), webfont)
                })
                .collect(),
        );
        provider
    }

    fn google(family: &str) -> RawWebfont {
        RawWebfont::new()
            .with("provider", "google")
            .with("font-family", family)
    }

    fn params(url: &Url, name: &str) -> Vec<String> {
        url.query_pairs()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .collect()
    }

    #[test]
    fn test_single_family_url() {
        let provider = provider_with(vec![
            google("Roboto").with("font-weight", "700").with("font-display", "swap"),
            google("Roboto").with("font-style", "italic").with("font-display", "swap"),
            google("Roboto").with("font-weight", "bold").with("font-display", "swap"),
        ]);

        let urls = provider.remote_stylesheets();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].host_str(), Some("fonts.googleapis.com"));
        assert_eq!(urls[0].path(), "/css2");
        assert_eq!(params(&urls[0], "family"), vec!["Roboto:ital,wght@0,700;1,400"]);
        assert_eq!(params(&urls[0], "display"), vec!["swap"]);
    }

    #[test]
    fn test_groups_by_display() {
        let provider = provider_with(vec![
            google("Roboto"),
            google("Lora").with("font-weight", "300 700"),
            google("Inter").with("font-display", "swap"),
        ]);

        let urls = provider.remote_stylesheets();
        assert_eq!(urls.len(), 2);
        assert_eq!(
            params(&urls[0], "family"),
            vec!["Roboto:ital,wght@0,400", "Lora:ital,wght@0,300..700"]
        );
        assert_eq!(params(&urls[0], "display"), vec!["fallback"]);
        assert_eq!(params(&urls[1], "family"), vec!["Inter:ital,wght@0,400"]);
        assert_eq!(params(&urls[1], "display"), vec!["swap"]);
    }

    #[test]
    fn test_long_urls_split() {
        let raws = (0..60)
            .map(|i| google(&format!("Family Number {:02} With A Long Name", i)))
            .collect();
        let provider = provider_with(raws);

        let urls = provider.remote_stylesheets();
        assert!(urls.len() > 1);
        assert!(urls.iter().all(|url| url.as_str().len() <= MAX_URL_LENGTH));

        let total: usize = urls.iter().map(|url| params(url, "family").len()).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_keyword_weights_without_variant() {
        let provider = provider_with(vec![google("Roboto").with("font-weight", "lighter")]);
        let urls = provider.remote_stylesheets();
        assert_eq!(params(&urls[0], "family"), vec!["Roboto"]);
    }

    #[test]
    fn test_preconnect_links() {
        let links = GoogleProvider::new().preconnect_links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href(), Some("https://fonts.gstatic.com"));
        assert!(links[0].render().unwrap().ends_with(" crossorigin>"));
        assert!(!links[1].render().unwrap().contains("crossorigin"));
    }

    #[test]
    fn test_no_webfonts_no_urls() {
        assert!(GoogleProvider::new().remote_stylesheets().is_empty());
        assert!(GoogleProvider::new().get_css().is_empty());
    }

    #[test]
    fn test_invalid_api_url() {
        let mut provider = GoogleProvider::with_api_url("not a url");
        provider.set_webfonts(provider_with(vec![google("Roboto")]).webfonts().clone());
        assert!(provider.remote_stylesheets().is_empty());
    }
}
