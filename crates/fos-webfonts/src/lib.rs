//! fOS Webfonts
//!
//! Webfont registration and style generation for pages rendered by fOS:
//! - Schema validation and normalization of `@font-face` descriptors
//! - Registry indexed by provider and font family
//! - Pluggable providers (self-hosted `local`, Google Fonts `google`)
//! - Preconnect hints, emitted at most once per provider
//! - theme.json font face import
//!
//! # Example
//! ```rust
//! use fos_webfonts::{InMemoryPage, RawWebfont, RenderPhase, WebfontsController};
//!
//! let mut controller = WebfontsController::default();
//! controller.init();
//! controller.register_webfont(
//!     RawWebfont::new()
//!         .with("provider", "local")
//!         .with("font-family", "Open Sans")
//!         .with("src", "/fonts/open-sans.woff2"),
//! );
//!
//! let mut page = InMemoryPage::new();
//! controller.generate_and_enqueue_styles(&mut page, RenderPhase::Head);
//! assert!(page.stylesheet("webfonts").contains("@font-face"));
//! ```

pub mod descriptor;
pub mod schema;
pub mod registry;
pub mod provider;
pub mod providers;
pub mod controller;
pub mod page;
pub mod theme_json;
pub mod config;

pub use descriptor::{
    family_slug, to_kebab_case, PropertyValue, RawWebfont, Webfont, WebfontKey, Webfonts,
};
pub use schema::{Correction, Normalized, SchemaError, SchemaValidator};
pub use registry::{Registration, WebfontsRegistry};
pub use provider::{AttributeValue, GoogleProvider, LocalProvider, PreconnectLink, WebfontsProvider};
pub use providers::{ProviderError, ProviderRegistry};
pub use controller::WebfontsController;
pub use page::{InMemoryPage, RenderPhase, StyleHost};
pub use theme_json::{webfonts_from_theme_json, ThemeJsonError};
pub use config::{ConfigError, WebfontsConfig};

/// Webfonts error types
#[derive(Debug, thiserror::Error)]
pub enum WebfontsError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    ThemeJson(#[from] ThemeJsonError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, WebfontsError>;
