//! Saved-item listings
//!
//! This module contains everything that reads the user's listing pages:
//! - Page specifications and ranges
//! - Pagination discovery
//! - Identifier extraction for the stories and comments views

mod parser;
mod walker;

pub use parser::{extract_more_link, parse_listing};
pub use walker::resolve_page_range;

use crate::session::Session;
use crate::HarvestError;
use std::num::NonZeroU32;

/// Which listing view to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    Stories,
    Comments,
}

impl ListingKind {
    /// Table cells that hold one item's links
    pub fn cell_selector(self) -> &'static str {
        match self {
            ListingKind::Stories => "td.subtext",
            ListingKind::Comments => "td.default",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ListingKind::Stories => "stories",
            ListingKind::Comments => "comments",
        }
    }
}

/// Requested number of listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSpec {
    /// Exactly this many pages, starting at 1
    Fixed(NonZeroU32),
    /// Follow pagination links until they run out
    Discover,
}

impl PageSpec {
    /// Maps the CLI page count; 0 means discover all pages
    pub fn from_count(count: u32) -> Self {
        match NonZeroU32::new(count) {
            Some(n) => PageSpec::Fixed(n),
            None => PageSpec::Discover,
        }
    }
}

/// Contiguous, 1-based, inclusive range of listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    last: u32,
}

impl PageRange {
    /// Pages `1..=last`
    pub fn new(last: u32) -> Self {
        Self { last }
    }

    pub fn len(&self) -> u32 {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.last == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        1..=self.last
    }
}

/// Collects item identifiers from every page in `range`
///
/// Identifiers are returned in page order and concatenated; an item listed
/// on two pages appears twice.
pub async fn scrape_listing(
    session: &Session,
    username: &str,
    kind: ListingKind,
    range: &PageRange,
) -> Result<Vec<String>, HarvestError> {
    let mut ids = Vec::new();

    for page in range.iter() {
        let url = session.listing_url(username, kind == ListingKind::Comments, Some(page))?;
        tracing::debug!("Scraping {} page {}: {}", kind.label(), page, url);

        let body = session.get_text(&url).await?;
        let found = parse_listing(&body, kind);
        tracing::debug!("Page {} listed {} {}", page, found.len(), kind.label());
        ids.extend(found);
    }

    tracing::info!(
        "Found {} saved {} across {} page(s)",
        ids.len(),
        kind.label(),
        range.len()
    );
    Ok(ids)
}
