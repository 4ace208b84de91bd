//! Output document and merge/cache layer
//!
//! The document written at the end of a run doubles as the cache for the next
//! one. It is loaded once into a [`CacheIndex`]; each identifier found on the
//! listing pages is then either reused from the index or fetched from the API.

use crate::item::{Item, ItemFetcher};
use crate::listing::ListingKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors reading or writing the output document
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("{path} is not a valid output document: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize output document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted result of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    #[serde(default)]
    pub saved_stories: Vec<Item>,

    #[serde(default)]
    pub saved_comments: Vec<Item>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection holding items of `kind`
    pub fn collection(&self, kind: ListingKind) -> &[Item] {
        match kind {
            ListingKind::Stories => &self.saved_stories,
            ListingKind::Comments => &self.saved_comments,
        }
    }

    pub fn collection_mut(&mut self, kind: ListingKind) -> &mut Vec<Item> {
        match kind {
            ListingKind::Stories => &mut self.saved_stories,
            ListingKind::Comments => &mut self.saved_comments,
        }
    }

    /// Serializes with 4-space indentation
    pub fn to_json_pretty(&self) -> Result<String, CacheError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Reads a previously written document
///
/// # Returns
///
/// * `Ok(None)` - No file, or an empty file
/// * `Ok(Some(doc))` - The parsed document
/// * `Err(CacheError::Corrupt)` - The file exists but does not parse; it is
///   left untouched rather than overwritten
pub fn load_snapshot(path: &Path) -> Result<Option<OutputDocument>, CacheError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CacheError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| CacheError::Corrupt {
            path: path.display().to_string(),
            source,
        })
}

/// Writes the document in one go
pub fn save_document(path: &Path, document: &OutputDocument) -> Result<(), CacheError> {
    let json = document.to_json_pretty()?;
    let write_err = |source| CacheError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut file = std::fs::File::create(path).map_err(write_err)?;
    file.write_all(json.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)
}

/// In-memory lookup over a cache snapshot, keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct CacheIndex {
    stories: HashMap<String, Item>,
    comments: HashMap<String, Item>,
}

impl CacheIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes both collections of a snapshot; the first record per id wins
    pub fn from_document(document: OutputDocument) -> Self {
        fn index(items: Vec<Item>) -> HashMap<String, Item> {
            let mut map = HashMap::with_capacity(items.len());
            for item in items {
                map.entry(item.id.key()).or_insert(item);
            }
            map
        }

        Self {
            stories: index(document.saved_stories),
            comments: index(document.saved_comments),
        }
    }

    pub fn lookup(&self, kind: ListingKind, id: &str) -> Option<&Item> {
        match kind {
            ListingKind::Stories => self.stories.get(id),
            ListingKind::Comments => self.comments.get(id),
        }
    }

    pub fn len(&self, kind: ListingKind) -> usize {
        match kind {
            ListingKind::Stories => self.stories.len(),
            ListingKind::Comments => self.comments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty() && self.comments.is_empty()
    }
}

/// Outcome counts of one merge pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub reused: usize,
    pub fetched: usize,
    pub placeholders: usize,
    pub duplicates: usize,
}

/// Resolves identifiers to records, reusing cached ones
///
/// When `cache` is given, an identifier found in it is reused verbatim and
/// the API is not called. Every other identifier is fetched exactly once.
/// Identifiers repeated in `ids` are dropped after their first occurrence, so
/// the returned collection never holds the same id twice.
pub async fn merge_items(
    ids: &[String],
    kind: ListingKind,
    cache: Option<&CacheIndex>,
    fetcher: &ItemFetcher,
) -> (Vec<Item>, MergeStats) {
    let mut items = Vec::with_capacity(ids.len());
    let mut stats = MergeStats::default();
    let mut seen = HashSet::new();
    let total = ids.len();

    for (position, id) in ids.iter().enumerate() {
        if !seen.insert(id.as_str()) {
            tracing::debug!("Skipping repeated {} id {}", kind.label(), id);
            stats.duplicates += 1;
            continue;
        }

        // Cached records are reused as-is
        if let Some(cached) = cache.and_then(|c| c.lookup(kind, id)) {
            tracing::debug!("Reusing cached item {}", id);
            items.push(cached.clone());
            stats.reused += 1;
            continue;
        }

        let item = fetcher.fetch(id).await;
        if item.is_placeholder() {
            stats.placeholders += 1;
        }
        stats.fetched += 1;
        items.push(item);
        tracing::info!("Got item {} ({} of {})", id, position + 1, total);
    }

    (items, stats)
}
