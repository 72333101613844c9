//! Document-level filters: language checks, duplicate detection and
//! content fingerprinting.
//!
//! Language *detection* is out of scope; the language gate only
//! consults what the document declares about itself (html `lang`,
//! `content-language`) and the metadata collected earlier.

use dom_query::Document;
use xxhash_rust::xxh3::xxh3_64;

use crate::html_processing::trim;
use crate::lru::LruCache;
use crate::options::ExtractionOptions;

/// Check the declared document language against the target.
///
/// Returns `false` (mismatch) only when the document declares a
/// language and none of the declarations start with the target code.
/// Documents without declarations pass.
#[must_use]
pub fn check_html_lang(doc: &Document, target_language: &str) -> bool {
    let target = target_language.to_ascii_lowercase();
    let mut declared = Vec::new();

    let html = doc.select("html");
    if let Some(lang) = html.attr("lang") {
        declared.push(lang.to_string());
    }
    for node in doc.select(r#"meta[http-equiv="content-language"]"#).nodes() {
        let sel = dom_query::Selection::from(*node);
        if let Some(content) = sel.attr("content") {
            declared.push(content.to_string());
        }
    }

    if declared.is_empty() {
        return true;
    }
    declared
        .iter()
        .any(|lang| lang.trim().to_ascii_lowercase().starts_with(&target))
}

/// Final language gate over the extracted text.
///
/// Returns `true` when the document should be *rejected*. Without a
/// detector this trusts the metadata language when present.
#[must_use]
pub fn language_filter(
    _text: &str,
    _comments: &str,
    target_language: &str,
    metadata_language: Option<&str>,
) -> bool {
    match metadata_language {
        Some(lang) => {
            let lang = lang.trim().to_ascii_lowercase();
            let target = target_language.to_ascii_lowercase();
            !lang.starts_with(&target)
        }
        None => false,
    }
}

/// Segment-level duplicate test backed by the LRU cache.
///
/// Counts every sufficiently long segment; returns `true` once the
/// same trimmed segment has been seen more than `max_repetitions`
/// times.
pub fn duplicate_test(text: &str, cache: &mut LruCache, opts: &ExtractionOptions) -> bool {
    let segment = trim(text);
    if segment.chars().count() < opts.min_duplicate_check_size {
        return false;
    }
    let seen = cache.put(&segment);
    seen > opts.max_repetitions
}

/// Opaque content fingerprint (xxh3 over the normalized text).
#[must_use]
pub fn content_fingerprint(text: &str) -> String {
    let normalized = trim(&text.to_lowercase());
    format!("{:016x}", xxh3_64(normalized.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_html_lang_matches_prefix() {
        let doc = Document::from(r#"<html lang="en-US"><body></body></html>"#);
        assert!(check_html_lang(&doc, "en"));
        assert!(!check_html_lang(&doc, "de"));
    }

    #[test]
    fn test_check_html_lang_passes_without_declaration() {
        let doc = Document::from("<html><body></body></html>");
        assert!(check_html_lang(&doc, "en"));
    }

    #[test]
    fn test_check_html_lang_meta_content_language() {
        let doc = Document::from(
            r#"<html><head><meta http-equiv="content-language" content="de"></head><body></body></html>"#,
        );
        assert!(check_html_lang(&doc, "de"));
        assert!(!check_html_lang(&doc, "fr"));
    }

    #[test]
    fn test_language_filter_rejects_mismatch() {
        assert!(language_filter("text", "", "en", Some("de")));
        assert!(!language_filter("text", "", "en", Some("en-GB")));
        assert!(!language_filter("text", "", "en", None));
    }

    #[test]
    fn test_duplicate_test_counts_long_segments() {
        let opts = ExtractionOptions::default();
        let mut cache = LruCache::new(16);
        let long = "x".repeat(120);
        assert!(!duplicate_test(&long, &mut cache, &opts));
        assert!(!duplicate_test(&long, &mut cache, &opts));
        // third occurrence crosses max_repetitions = 2
        assert!(duplicate_test(&long, &mut cache, &opts));
    }

    #[test]
    fn test_duplicate_test_ignores_short_segments() {
        let opts = ExtractionOptions::default();
        let mut cache = LruCache::new(16);
        for _ in 0..5 {
            assert!(!duplicate_test("short", &mut cache, &opts));
        }
    }

    #[test]
    fn test_fingerprint_is_stable_and_normalized() {
        let a = content_fingerprint("Some   Text here");
        let b = content_fingerprint("some text  HERE");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, content_fingerprint("different"));
    }
}
