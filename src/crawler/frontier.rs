//! Crawl frontier and visited set
//!
//! The frontier is an insertion-ordered, deduplicated list of canonical
//! URLs. Entries before the cursor have been handed out for fetching
//! (the visited set); entries after it are pending for the next level.

use crate::url::frontier_key;
use std::collections::HashSet;

/// A canonical URL and the level at which it was discovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

/// Ordered, deduplicated worklist of one crawl invocation
#[derive(Debug, Clone)]
pub struct Frontier {
    entries: Vec<FrontierEntry>,
    seen: HashSet<String>,
    cursor: usize,
}

impl Frontier {
    /// Creates a frontier holding only the crawl root at depth 0
    pub fn new(root: &str) -> Self {
        let mut frontier = Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            cursor: 0,
        };
        frontier.push(root, 0);
        frontier
    }

    /// Appends a URL unless an entry with the same key already exists
    ///
    /// Returns true if the URL was new.
    pub fn push(&mut self, url: &str, depth: u32) -> bool {
        if !self.seen.insert(frontier_key(url).to_string()) {
            return false;
        }

        self.entries.push(FrontierEntry {
            url: url.to_string(),
            depth,
        });
        true
    }

    /// Takes the snapshot of entries not yet handed out and marks them visited
    pub fn next_level(&mut self) -> Vec<FrontierEntry> {
        let level = self.entries[self.cursor..].to_vec();
        self.cursor = self.entries.len();
        level
    }

    /// Number of entries already handed out
    pub fn visited_count(&self) -> usize {
        self.cursor
    }

    /// Number of entries waiting for the next level
    pub fn pending_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All URLs in insertion order, root first
    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.url.clone()).collect()
    }
}
