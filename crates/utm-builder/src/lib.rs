//! Campaign-tagging (UTM) URL builder.
//!
//! Appends `utm_source`, `utm_medium`, `utm_campaign`, `utm_content` and
//! `utm_term` to a base URL. Source and medium come from a fixed taxonomy;
//! the free-text fields are sanitized to `[a-z0-9_-]`.
//!
//! # Example
//!
//! ```
//! use utm_builder::{build_utm_url, UtmParams};
//!
//! let params = UtmParams {
//!     source: "social".into(),
//!     medium: "facebook".into(),
//!     campaign: "Spring Sale! 2024".into(),
//!     ..Default::default()
//! };
//! assert_eq!(
//!     build_utm_url("https://shop.example/", &params),
//!     "https://shop.example/?utm_source=social&utm_medium=facebook&utm_campaign=spring_sale_2024"
//! );
//! ```
//!
//! # Modules
//!
//! - [`taxonomy`]: Allowed sources and their mediums
//! - [`url`]: Sanitizer, validation and the pure URL builder
//! - [`builder`]: Stateful builder form that reports analytics events

pub mod builder;
pub mod taxonomy;
pub mod url;

pub use builder::{Clipboard, UtmBuilder};
pub use taxonomy::{find_source, sources, Medium, Source};
pub use url::{build_utm_url, is_valid_base_url, sanitize_utm_value, utm_pairs, GeneratedUrl, UtmParams};

/// Errors raised by the builder form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UtmError {
    /// Base URL is missing or not http(s)
    #[error("invalid base URL: '{0}'")]
    InvalidBaseUrl(String),
    /// Source not in the taxonomy
    #[error("unknown source: '{0}'")]
    UnknownSource(String),
    /// Medium not allowed for the selected source
    #[error("medium '{medium}' is not available for source '{source_key}'")]
    UnknownMedium { source_key: String, medium: String },
    /// Medium picked before any source
    #[error("select a source before choosing a medium")]
    NoSource,
    /// Nothing to copy yet
    #[error("no tagged URL to copy")]
    NothingToCopy,
    /// Clipboard write refused by the environment
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}
