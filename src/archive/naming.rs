//! Directory and file names for archived stories
//!
//! Titles become path components, so they are sanitized first. When a title
//! leaves nothing usable, or clashes with a name already handed out, the item
//! identifier is used instead.
//!
//! Every story folder carries an owner marker holding the item id. A folder
//! left by an earlier run only goes to the item that owns it, so names stay
//! stable from one run to the next.

use crate::item::Item;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File inside each story folder naming the item it belongs to
pub const OWNER_MARKER: &str = ".hn-item-id";

/// Characters rejected by at least one common filesystem
const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Names Windows reserves regardless of extension
const RESERVED: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Makes a title safe to use as a single path component
///
/// Unsafe and control characters become `_`, leading and trailing whitespace
/// and dots are trimmed, and the result is cut to `max_len` characters.
/// Returns `None` if nothing usable is left.
pub fn sanitize_title(title: &str, max_len: usize) -> Option<String> {
    let replaced: String = title
        .chars()
        .map(|c| {
            if c.is_control() || UNSAFE_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    let truncated: String = trimmed.chars().take(max_len).collect();
    let name = truncated.trim_end_matches(|c: char| c.is_whitespace() || c == '.');

    if name.is_empty() || name.chars().all(|c| c == '_') || is_reserved(name) {
        None
    } else {
        Some(name.to_string())
    }
}

fn is_reserved(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name).to_lowercase();
    RESERVED.contains(&stem.as_str())
}

/// Hands out one unique folder name per story under an output root
#[derive(Debug)]
pub struct NameAllocator {
    root: PathBuf,
    max_len: usize,
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new(root: &Path, max_len: usize) -> Self {
        Self {
            root: root.to_path_buf(),
            max_len,
            used: HashSet::new(),
        }
    }

    /// Name for `item`: its sanitized title, or its identifier as a fallback
    ///
    /// Uniqueness is checked case-insensitively, since several filesystems
    /// fold case. A folder already on disk is taken only by its owner.
    pub fn allocate(&mut self, item: &Item) -> String {
        let id = item.id.key();

        let from_title = item
            .title
            .as_deref()
            .and_then(|t| sanitize_title(t, self.max_len))
            .filter(|name| self.is_free(name, &id));

        let name = match from_title {
            Some(name) => name,
            None => {
                let fallback =
                    sanitize_title(&id, self.max_len).unwrap_or_else(|| "item".to_string());
                let mut candidate = fallback.clone();
                let mut n = 2;
                while !self.is_free(&candidate, &id) {
                    candidate = format!("{}-{}", fallback, n);
                    n += 1;
                }
                candidate
            }
        };

        self.used.insert(name.to_lowercase());
        name
    }

    fn is_free(&self, name: &str, id: &str) -> bool {
        if self.used.contains(&name.to_lowercase()) {
            return false;
        }

        let folder = self.root.join(name);
        if !folder.exists() {
            return true;
        }

        // Unmarked or unreadable folders belong to someone else
        match read_owner(&folder) {
            Some(owner) => owner == id,
            None => false,
        }
    }
}

/// Item id recorded in a story folder, if any
pub fn read_owner(folder: &Path) -> Option<String> {
    std::fs::read_to_string(folder.join(OWNER_MARKER))
        .ok()
        .map(|owner| owner.trim().to_string())
}

/// Records `item` as the owner of `folder`
pub fn claim_folder(folder: &Path, item: &Item) -> std::io::Result<()> {
    let marker = folder.join(OWNER_MARKER);
    if marker.exists() {
        return Ok(());
    }
    std::fs::write(marker, item.id.key())
}
