//! Webfonts Configuration

use serde::{Deserialize, Serialize};
use url::Url;

use crate::provider::GOOGLE_FONTS_API_URL;

/// Webfonts configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebfontsConfig {
    /// Stylesheet handle for styles generated before the head is printed
    pub head_handle: String,

    /// Stylesheet handle for styles generated after the head is printed
    pub footer_handle: String,

    /// Stylesheet handle the editor styles attach to
    pub editor_handle: String,

    /// Register the `local` and `google` providers on init
    pub register_builtin_providers: bool,

    /// Google Fonts CSS2 API endpoint
    pub google_api_url: String,

    /// Site origin; local font URLs on it are emitted root-relative
    pub site_url: Option<String>,
}

impl Default for WebfontsConfig {
    fn default() -> Self {
        Self {
            head_handle: "webfonts".to_string(),
            footer_handle: "webfonts-footer".to_string(),
            editor_handle: "wp-block-library".to_string(),
            register_builtin_providers: true,
            google_api_url: GOOGLE_FONTS_API_URL.to_string(),
            site_url: None,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL in {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        source: url::ParseError,
    },
}

impl WebfontsConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WebfontsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.google_api_url).map_err(|source| ConfigError::InvalidUrl {
            field: "google_api_url",
            source,
        })?;
        self.site_url()?;
        Ok(())
    }

    /// Parsed site URL
    pub fn site_url(&self) -> Result<Option<Url>, ConfigError> {
        self.site_url
            .as_deref()
            .map(|site_url| {
                Url::parse(site_url).map_err(|source| ConfigError::InvalidUrl {
                    field: "site_url",
                    source,
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WebfontsConfig::default();
        assert_eq!(config.head_handle, "webfonts");
        assert_eq!(config.footer_handle, "webfonts-footer");
        assert!(config.register_builtin_providers);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = WebfontsConfig::from_json(r#"{"site_url": "https://example.com"}"#).unwrap();
        assert_eq!(config.head_handle, "webfonts");
        assert_eq!(config.site_url().unwrap().unwrap().host_str(), Some("example.com"));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            WebfontsConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            WebfontsConfig::from_json(r#"{"google_api_url": "nope"}"#),
            Err(ConfigError::InvalidUrl { field: "google_api_url", .. })
        ));
    }
}
