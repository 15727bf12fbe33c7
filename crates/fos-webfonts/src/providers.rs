//! Provider Registry
//!
//! Provider instances keyed by id, and the preconnect links they emit.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::WebfontsConfig;
use crate::provider::{GoogleProvider, LocalProvider, WebfontsProvider};

/// Provider registration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Webfonts provider has an empty id")]
    EmptyId,
}

/// Registered webfont providers
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: IndexMap<String, Box<dyn WebfontsProvider>>,
    /// Providers whose preconnect links were already emitted
    preconnected: HashSet<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in `local` and `google` providers
    pub fn init(&mut self, config: &WebfontsConfig) {
        let mut local = LocalProvider::new();
        match config.site_url() {
            Ok(Some(site_url)) => local = local.with_site_url(site_url),
            Ok(None) => {}
            Err(err) => tracing::warn!("Ignoring site URL: {}", err),
        }

        // Built-in ids are never empty
        let _ = self.register(Box::new(local));
        let _ = self.register(Box::new(GoogleProvider::with_api_url(&config.google_api_url)));
    }

    /// Register a provider. The first provider registered under an id wins;
    /// later ones are dropped and the id is still returned.
    pub fn register(
        &mut self,
        provider: Box<dyn WebfontsProvider>,
    ) -> Result<String, ProviderError> {
        let id = provider.id().to_string();
        if id.is_empty() {
            return Err(ProviderError::EmptyId);
        }

        if self.providers.contains_key(&id) {
            tracing::debug!(provider = %id, "Webfonts provider already registered");
        } else {
            tracing::info!(provider = %id, "Registered webfonts provider");
            self.providers.insert(id.clone(), provider);
        }
        Ok(id)
    }

    /// Register a provider built by `factory`
    pub fn register_with<P, F>(&mut self, factory: F) -> Result<String, ProviderError>
    where
        P: WebfontsProvider + 'static,
        F: FnOnce() -> P,
    {
        self.register(Box::new(factory()))
    }

    pub fn get(&self, id: &str) -> Option<&dyn WebfontsProvider> {
        match self.providers.get(id) {
            Some(provider) => Some(provider.as_ref()),
            None => None,
        }
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut dyn WebfontsProvider> {
        match self.providers.get_mut(id) {
            Some(provider) => Some(provider.as_mut()),
            None => None,
        }
    }

    /// Provider ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// `<link rel="preconnect">` tags for providers that have not emitted
    /// them yet. Each provider contributes at most once.
    pub fn get_preconnect_links(&mut self) -> String {
        let ids: Vec<String> = self.providers.keys().cloned().collect();
        self.preconnect_links_for(&ids)
    }

    /// Like `get_preconnect_links`, limited to the given providers
    pub fn preconnect_links_for(&mut self, ids: &[String]) -> String {
        let mut html = String::new();
        for id in ids {
            if self.preconnected.contains(id) {
                continue;
            }
            let Some(provider) = self.providers.get(id) else {
                continue;
            };

            for link in provider.preconnect_links() {
                match link.render() {
                    Some(tag) => {
                        html.push_str(&tag);
                        html.push('\n');
                    }
                    None => tracing::warn!(
                        provider = %id,
                        href = ?link.href(),
                        "Skipping preconnect link without a valid href"
                    ),
                }
            }
            self.preconnected.insert(id.clone());
        }
        html
    }
}
