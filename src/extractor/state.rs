//! Extraction state tracking.
//!
//! Holds the set of tags permitted in the output for the current
//! round (`potential_tags`), the container tags whose envelope is
//! discarded while their children are hoisted (`tags_to_enumerate`),
//! and the deduplication cache. Consumed nodes are marked by retagging
//! them `done` in the tree itself; the sentinel is stripped from the
//! result at the end of extraction.

use std::collections::HashSet;

use crate::lru::LruCache;
use crate::options::ExtractionOptions;

use super::TAG_CATALOG;

/// Mutable per-extraction state.
pub struct ExtractionState {
    potential_tags: HashSet<String>,
    tags_to_enumerate: HashSet<String>,
    /// Segment cache, present when deduplication is on.
    pub cache: Option<LruCache>,
    /// Mirror of the deduplicate option, threaded into the node cleaner.
    pub deduplicate: bool,
}

impl ExtractionState {
    /// Build the state for one extraction run from the options.
    #[must_use]
    pub fn new(opts: &ExtractionOptions) -> Self {
        let mut potential_tags: HashSet<String> =
            TAG_CATALOG.iter().map(|t| (*t).to_string()).collect();
        let mut tags_to_enumerate: HashSet<String> =
            ["article", "main", "section", "header"]
                .iter()
                .map(|t| (*t).to_string())
                .collect();

        if opts.include_tables {
            // only the table envelope: raw td/th/tr never enter the
            // permitted output set
            potential_tags.insert("table".to_string());
        }
        if opts.include_images {
            potential_tags.insert("graphic".to_string());
            for tag in ["figure", "picture", "source"] {
                tags_to_enumerate.insert(tag.to_string());
            }
        }
        if opts.include_links {
            potential_tags.insert("ref".to_string());
        }

        Self {
            potential_tags,
            tags_to_enumerate,
            cache: opts
                .deduplicate
                .then(|| LruCache::new(opts.dedup_cache_size)),
            deduplicate: opts.deduplicate,
        }
    }

    #[must_use]
    pub fn is_potential(&self, tag: &str) -> bool {
        self.potential_tags.contains(tag)
    }

    pub fn add_potential(&mut self, tag: &str) {
        self.potential_tags.insert(tag.to_string());
    }

    pub fn remove_potential(&mut self, tag: &str) {
        self.potential_tags.remove(tag);
    }

    #[must_use]
    pub fn is_enumerable(&self, tag: &str) -> bool {
        self.tags_to_enumerate.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_potential_tags() {
        let state = ExtractionState::new(&ExtractionOptions::default());
        assert!(state.is_potential("p"));
        assert!(state.is_potential("head"));
        assert!(state.is_potential("quote"));
        assert!(state.is_potential("table")); // include_tables defaults on
        assert!(!state.is_potential("graphic"));
        assert!(!state.is_potential("ref"));
        assert!(!state.is_potential("div"));
        assert!(!state.is_potential("td"));
        assert!(!state.is_potential("tr"));
    }

    #[test]
    fn test_options_extend_potential_tags() {
        let opts = ExtractionOptions {
            include_images: true,
            include_links: true,
            ..ExtractionOptions::default()
        };
        let state = ExtractionState::new(&opts);
        assert!(state.is_potential("graphic"));
        assert!(state.is_potential("ref"));
        assert!(state.is_enumerable("figure"));
        assert!(state.is_enumerable("picture"));
    }

    #[test]
    fn test_tables_toggle() {
        let opts = ExtractionOptions {
            include_tables: false,
            ..ExtractionOptions::default()
        };
        let state = ExtractionState::new(&opts);
        assert!(!state.is_potential("table"));
    }

    #[test]
    fn test_enumerable_defaults() {
        let state = ExtractionState::new(&ExtractionOptions::default());
        for tag in ["article", "main", "section", "header"] {
            assert!(state.is_enumerable(tag));
        }
        assert!(!state.is_enumerable("figure"));
        assert!(!state.is_enumerable("div"));
    }

    #[test]
    fn test_add_remove_potential() {
        let mut state = ExtractionState::new(&ExtractionOptions::default());
        assert!(!state.is_potential("div"));
        state.add_potential("div");
        assert!(state.is_potential("div"));
        state.remove_potential("div");
        assert!(!state.is_potential("div"));
    }

    #[test]
    fn test_cache_follows_deduplicate() {
        let state = ExtractionState::new(&ExtractionOptions::default());
        assert!(state.cache.is_none());
        let opts = ExtractionOptions {
            deduplicate: true,
            ..ExtractionOptions::default()
        };
        let state = ExtractionState::new(&opts);
        assert!(state.cache.is_some());
        assert!(state.deduplicate);
    }
}
