//! Webfonts Controller
//!
//! Ties the webfonts registry to the providers and hands the generated
//! styles to the host page.

use url::Url;

use crate::config::WebfontsConfig;
use crate::descriptor::{RawWebfont, WebfontKey};
use crate::page::{RenderPhase, StyleHost};
use crate::provider::WebfontsProvider;
use crate::providers::ProviderRegistry;
use crate::registry::{Registration, WebfontsRegistry};
use crate::theme_json::webfonts_from_theme_json;

/// Webfonts controller, one per rendered page
#[derive(Debug)]
pub struct WebfontsController {
    config: WebfontsConfig,
    registry: WebfontsRegistry,
    providers: ProviderRegistry,
    /// Providers that had webfonts and still owe their preconnect links
    pending_links: Vec<String>,
}

impl Default for WebfontsController {
    fn default() -> Self {
        Self::new(WebfontsConfig::default())
    }
}

impl WebfontsController {
    pub fn new(config: WebfontsConfig) -> Self {
        Self {
            config,
            registry: WebfontsRegistry::new(),
            providers: ProviderRegistry::new(),
            pending_links: Vec::new(),
        }
    }

    /// Controller configured from JSON
    pub fn from_config_json(json: &str) -> crate::Result<Self> {
        Ok(Self::new(WebfontsConfig::from_json(json)?))
    }

    /// Register the built-in providers, if configured to
    pub fn init(&mut self) {
        if self.config.register_builtin_providers {
            self.providers.init(&self.config);
        }
    }

    pub fn config(&self) -> &WebfontsConfig {
        &self.config
    }

    pub fn webfonts(&self) -> &WebfontsRegistry {
        &self.registry
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Register webfonts in order. Invalid ones are skipped; the keys of the
    /// registered ones are returned.
    pub fn register_webfonts<I>(&mut self, webfonts: I) -> Vec<WebfontKey>
    where
        I: IntoIterator<Item = RawWebfont>,
    {
        webfonts
            .into_iter()
            .filter_map(|webfont| self.register_webfont(webfont))
            .collect()
    }

    /// Register one webfont; `None` when it fails the schema
    pub fn register_webfont(&mut self, webfont: RawWebfont) -> Option<WebfontKey> {
        // The registry logs the reason
        self.try_register_webfont(webfont)
            .ok()
            .map(|registration| registration.key)
    }

    pub fn try_register_webfont(&mut self, webfont: RawWebfont) -> crate::Result<Registration> {
        Ok(self.registry.register(webfont)?)
    }

    pub fn register_provider(
        &mut self,
        provider: Box<dyn WebfontsProvider>,
    ) -> crate::Result<String> {
        Ok(self.providers.register(provider)?)
    }

    /// Register the font faces a theme.json declares
    pub fn register_theme_json(
        &mut self,
        json: &str,
        theme_root: &Url,
    ) -> crate::Result<Vec<WebfontKey>> {
        let webfonts = webfonts_from_theme_json(json, theme_root)?;
        Ok(self.register_webfonts(webfonts))
    }

    /// CSS for every provider that has webfonts. Remote stylesheet imports
    /// come first, then each provider's rules in provider order.
    pub fn generate_styles(&mut self) -> String {
        let mut imports = String::new();
        let mut rules = String::new();

        let ids: Vec<String> = self.providers.ids().map(str::to_string).collect();
        for id in ids {
            let webfonts = self.registry.get_by_provider(&id);
            if webfonts.is_empty() {
                continue;
            }
            let Some(provider) = self.providers.get_mut(&id) else {
                continue;
            };

            provider.set_webfonts(webfonts);
            for url in provider.remote_stylesheets() {
                imports.push_str(&format!("@import url(\"{}\");\n", url));
            }
            rules.push_str(&provider.get_css());

            if !self.pending_links.contains(&id) {
                self.pending_links.push(id);
            }
        }

        let unrouted = self
            .registry
            .providers_in_use()
            .into_iter()
            .filter(|id| !self.providers.contains(id))
            .count();
        if unrouted > 0 {
            tracing::warn!(providers = unrouted, "Webfonts registered for unknown providers");
        }

        imports + &rules
    }

    /// Preconnect links of the providers that had webfonts, each at most once
    pub fn render_links(&mut self) -> String {
        if self.pending_links.is_empty() {
            return String::new();
        }
        let ids = std::mem::take(&mut self.pending_links);
        self.providers.preconnect_links_for(&ids)
    }

    /// Generate the styles and attach them to the page. Before the head is
    /// printed, preconnect links are printed into it too.
    pub fn generate_and_enqueue_styles(&mut self, host: &mut dyn StyleHost, phase: RenderPhase) {
        let css = self.generate_styles();
        if !css.is_empty() {
            let handle = match phase {
                RenderPhase::Head => &self.config.head_handle,
                RenderPhase::Footer => &self.config.footer_handle,
            };
            host.add_inline_style(handle, &css);
        }

        if phase == RenderPhase::Head {
            let links = self.render_links();
            if !links.is_empty() {
                host.print_head(&links);
            }
        }
    }

    /// Generate the styles and attach them to the editor stylesheet
    pub fn generate_and_enqueue_editor_styles(&mut self, host: &mut dyn StyleHost) {
        let css = self.generate_styles();
        if !css.is_empty() {
            host.add_inline_style(&self.config.editor_handle, &css);
        }
    }
}
