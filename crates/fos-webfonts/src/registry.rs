//! Webfonts Registry
//!
//! Append-only store of validated webfonts, indexed by provider and by
//! font family.

use std::collections::HashMap;

use crate::descriptor::{family_slug, RawWebfont, WebfontKey, Webfont, Webfonts};
use crate::schema::{Correction, Normalized, SchemaError, SchemaValidator};

/// Outcome of a successful registration
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub key: WebfontKey,
    /// Corrections applied while normalizing
    pub corrections: Vec<Correction>,
    /// False when the key was already registered and the stored entry kept
    pub is_new: bool,
}

/// Webfonts registry
#[derive(Debug, Default)]
pub struct WebfontsRegistry {
    validator: SchemaValidator,
    registered: Webfonts,
    // Index lists may hold keys that are not in `registered`; lookups skip them.
    by_provider: HashMap<String, Vec<WebfontKey>>,
    by_family: HashMap<String, Vec<WebfontKey>>,
}

impl WebfontsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, normalize and store a webfont.
    ///
    /// Registering a key that already exists keeps the stored webfont and
    /// returns its key.
    pub fn register(&mut self, webfont: RawWebfont) -> Result<Registration, SchemaError> {
        let webfont = webfont.into_kebab_case();

        if let Err(err) = self.validator.validate_schema(&webfont) {
            tracing::warn!("Webfont not registered: {}", err);
            return Err(err);
        }

        let Normalized { webfont, corrections } = self.validator.set_valid_properties(webfont);
        let key = webfont.key();

        if self.registered.contains_key(&key) {
            tracing::debug!(key = %key, "Webfont already registered");
            return Ok(Registration { key, corrections, is_new: false });
        }

        self.by_provider
            .entry(webfont.provider().to_string())
            .or_default()
            .push(key.clone());
        self.by_family
            .entry(webfont.family_slug())
            .or_default()
            .push(key.clone());
        self.registered.insert(key.clone(), webfont);

        Ok(Registration { key, corrections, is_new: true })
    }

    /// Webfonts routed to a provider
    pub fn get_by_provider(&self, provider_id: &str) -> Webfonts {
        self.collect(self.by_provider.get(provider_id))
    }

    /// Webfonts of a family; the family is matched by slug
    pub fn get_by_font_family(&self, font_family: &str) -> Webfonts {
        let slug = family_slug(font_family);
        if slug.is_empty() {
            return Webfonts::new();
        }
        self.collect(self.by_family.get(&slug))
    }

    /// All registered webfonts, in registration order
    pub fn get_all_registered(&self) -> &Webfonts {
        &self.registered
    }

    pub fn get(&self, key: &str) -> Option<&Webfont> {
        self.registered.get(key)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Provider ids with at least one webfont, in first-registration order
    pub fn providers_in_use(&self) -> Vec<&str> {
        let mut providers: Vec<&str> = Vec::new();
        for webfont in self.registered.values() {
            if !providers.contains(&webfont.provider()) {
                providers.push(webfont.provider());
            }
        }
        providers
    }

    fn collect(&self, keys: Option<&Vec<WebfontKey>>) -> Webfonts {
        keys.into_iter()
            .flatten()
            .filter_map(|key| {
                self.registered
                    .get(key)
                    .map(|webfont| (key.clone(), webfont.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webfont(provider: &str, family: &str) -> RawWebfont {
        RawWebfont::new()
            .with("provider", provider)
            .with("font-family", family)
    }

    #[test]
    fn test_register_defaults_key() {
        let mut registry = WebfontsRegistry::new();
        let registration = registry.register(webfont("local", "Open Sans")).unwrap();

        assert_eq!(registration.key, "open-sans.normal.400");
        assert!(registration.is_new);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = WebfontsRegistry::new();
        let first = registry
            .register(webfont("local", "Open Sans").with("src", "first.woff2"))
            .unwrap();
        let second = registry
            .register(webfont("google", "open sans").with("src", "second.woff2"))
            .unwrap();

        assert_eq!(first.key, second.key);
        assert!(!second.is_new);
        assert_eq!(registry.len(), 1);

        // First registration is kept
        let stored = registry.get("open-sans.normal.400").unwrap();
        assert_eq!(stored.provider(), "local");
        assert!(registry.get_by_provider("google").is_empty());
    }

    #[test]
    fn test_register_invalid_leaves_state() {
        let mut registry = WebfontsRegistry::new();

        assert_eq!(registry.register(RawWebfont::new()), Err(SchemaError::MissingProvider));
        assert_eq!(
            registry.register(webfont("local", "   ")),
            Err(SchemaError::InvalidFontFamily)
        );
        assert!(registry.is_empty());
        assert!(registry.by_provider.is_empty());
        assert!(registry.by_family.is_empty());
    }

    #[test]
    fn test_register_converts_key_case() {
        let mut registry = WebfontsRegistry::new();
        let raw = RawWebfont::new()
            .with("provider", "local")
            .with("fontFamily", "Roboto")
            .with("fontWeight", "700")
            .with("fontStyle", "italic");

        let registration = registry.register(raw).unwrap();
        assert_eq!(registration.key, "roboto.italic.700");
    }

    #[test]
    fn test_lookup_by_family_and_provider() {
        let mut registry = WebfontsRegistry::new();
        registry.register(webfont("local", "Open Sans")).unwrap();
        registry
            .register(webfont("local", "Open Sans").with("font-weight", "700"))
            .unwrap();
        registry.register(webfont("google", "Roboto")).unwrap();

        assert_eq!(registry.get_by_font_family("Open Sans").len(), 2);
        assert_eq!(registry.get_by_font_family("open sans").len(), 2);
        assert_eq!(registry.get_by_font_family("").len(), 0);
        assert_eq!(registry.get_by_provider("local").len(), 2);
        assert_eq!(registry.get_by_provider("google").len(), 1);
        assert!(registry.get_by_provider("nonexistent").is_empty());
        assert_eq!(registry.providers_in_use(), vec!["local", "google"]);
    }

    #[test]
    fn test_stale_index_keys_skipped() {
        let mut registry = WebfontsRegistry::new();
        registry.register(webfont("local", "Lato")).unwrap();

        let stale = WebfontKey::new("Gone", "normal", "400");
        registry.by_provider.get_mut("local").unwrap().push(stale.clone());
        registry.by_family.entry("lato".to_string()).or_default().push(stale);

        let local = registry.get_by_provider("local");
        assert_eq!(local.len(), 1);
        assert!(local.contains_key("lato.normal.400"));
        assert_eq!(registry.get_by_font_family("Lato").len(), 1);
    }

    #[test]
    fn test_index_invariant() {
        let mut registry = WebfontsRegistry::new();
        for (provider, family, weight) in [
            ("local", "Inter", "400"),
            ("local", "Inter", "700"),
            ("google", "Lora", "400"),
            ("google", "Inter", "400"),
        ] {
            let _ = registry.register(webfont(provider, family).with("font-weight", weight));
        }

        for (provider, keys) in &registry.by_provider {
            for key in keys {
                if let Some(webfont) = registry.registered.get(key) {
                    assert_eq!(webfont.provider(), provider);
                }
            }
        }
        for (slug, keys) in &registry.by_family {
            for key in keys {
                if let Some(webfont) = registry.registered.get(key) {
                    assert_eq!(&webfont.family_slug(), slug);
                }
            }
        }
    }
}
