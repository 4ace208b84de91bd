//! Configuration module for hn-harvest
//!
//! Command-line arguments and an optional TOML settings file are resolved
//! once into a [`RunConfig`], which every component receives explicitly.
//!
//! # Example
//!
//! ```no_run
//! use hn_harvest::config::load_settings;
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("harvest.toml")).unwrap();
//! println!("Listing path: {}", settings.site.listing_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, CacheConfig, PdfConfig, RunConfig, Selection, Settings, SiteConfig,
};

// Re-export parser functions
pub use parser::{load_settings, load_settings_or_default, parse_settings};
