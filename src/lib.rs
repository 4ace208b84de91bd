//! hn-harvest: archive a user's saved Hacker News items
//!
//! This crate logs into the site, walks the user's saved story and comment
//! listings, resolves every item through the public JSON API, merges the
//! result with a previously written JSON document, and optionally renders each
//! story and its discussion thread to PDF.

pub mod archive;
pub mod cache;
pub mod config;
pub mod harvest;
pub mod item;
pub mod listing;
pub mod session;

use thiserror::Error;

/// Main error type for hn-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] session::AuthError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for hn-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::OutputDocument;
pub use config::{RunConfig, Settings};
pub use harvest::{run_harvest, Harvester, RunSummary};
pub use item::{Item, ItemId, ItemKind};
