//! Pagination walker
//!
//! Turns the requested page count into a concrete [`PageRange`], either
//! directly or by following "more" links from the first listing page.

use crate::listing::parser::extract_more_link;
use crate::listing::{PageRange, PageSpec};
use crate::session::Session;
use crate::HarvestError;
use std::collections::HashSet;

/// Resolves a [`PageSpec`] into the pages to scrape
///
/// `Fixed(n)` maps straight to `1..=n` without any request. `Discover` GETs
/// the first stories listing page and follows its "more" link until a page
/// has none; the range covers every page visited. Discovery also stops if a
/// link repeats or `max_pages` pages have been visited.
pub async fn resolve_page_range(
    session: &Session,
    username: &str,
    spec: PageSpec,
    max_pages: u32,
) -> Result<PageRange, HarvestError> {
    match spec {
        PageSpec::Fixed(n) => Ok(PageRange::new(n.get())),
        PageSpec::Discover => discover_page_count(session, username, max_pages)
            .await
            .map(PageRange::new),
    }
}

async fn discover_page_count(
    session: &Session,
    username: &str,
    max_pages: u32,
) -> Result<u32, HarvestError> {
    // Fetch the first stories page
    let first = session.listing_url(username, false, None)?;
    tracing::info!("Fetching {}", first);
    let mut more = extract_more_link(&session.get_text(&first).await?);

    let mut pages = 1;
    let mut seen = HashSet::new();

    // Follow "more" links until they run out
    while let Some(href) = more {
        if !seen.insert(href.clone()) {
            tracing::warn!("Pagination link {} repeated, stopping at page {}", href, pages);
            break;
        }
        if pages >= max_pages {
            tracing::warn!("Reached the discovery limit of {} pages", max_pages);
            break;
        }

        let url = session.resolve(&href)?;
        tracing::info!("Fetching {}", url);
        more = extract_more_link(&session.get_text(&url).await?);
        pages += 1;
    }

    Ok(pages)
}
