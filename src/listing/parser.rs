//! HTML parser for saved-item listing pages
//!
//! This module extracts:
//! - Item identifiers from story (`td.subtext`) and comment (`td.default`) cells
//! - The "more" pagination link (`a.morelink`)

use crate::listing::ListingKind;
use scraper::{Html, Selector};

/// Extracts item identifiers from a listing page, in page order
///
/// Every qualifying cell contributes at most one identifier: the target of
/// the first link in it pointing at `item?...`. Later item links in the same
/// cell (hide, past, vote controls) are ignored.
///
/// # Example
///
/// ```
/// use hn_harvest::listing::{parse_listing, ListingKind};
///
/// let html = r#"<table><tr><td class="subtext">
///     <a href="user?id=pg">pg</a> <a href="item?id=1">1 hour ago</a>
///     <a href="hide?id=1">hide</a> <a href="item?id=1&amp;goto=x">discuss</a>
/// </td></tr></table>"#;
/// assert_eq!(parse_listing(html, ListingKind::Stories), vec!["1".to_string()]);
/// ```
pub fn parse_listing(html: &str, kind: ListingKind) -> Vec<String> {
    let document = Html::parse_document(html);

    let (Ok(cell_selector), Ok(link_selector)) =
        (Selector::parse(kind.cell_selector()), Selector::parse("a[href]"))
    else {
        return Vec::new();
    };

    document
        .select(&cell_selector)
        .filter_map(|cell| {
            cell.select(&link_selector)
                .filter_map(|a| a.value().attr("href"))
                .find_map(item_id_from_href)
        })
        .collect()
}

/// Returns the href of the page's "more" link, if any
pub fn extract_more_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.morelink[href]").ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Pulls the identifier out of an `item?id=<id>` href
fn item_id_from_href(href: &str) -> Option<String> {
    let query = href.trim().strip_prefix("item?")?;
    let (_, rest) = query.split_once("id=")?;
    let id = rest.split('&').next().unwrap_or_default();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
