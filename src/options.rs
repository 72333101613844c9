//! Configuration options for content extraction.
//!
//! The `ExtractionOptions` struct controls extraction behavior,
//! allowing users to tune the precision/recall tradeoff and
//! enable/disable specific features.

use std::collections::HashSet;

/// Requested output serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text, formatting rendered as Markdown-style markers when
    /// `include_formatting` is set.
    #[default]
    Txt,
    /// Tab-separated line: text, comments, metadata fields.
    Csv,
    /// JSON object with metadata and flattened text.
    Json,
    /// The internal vocabulary serialized as XML.
    Xml,
    /// TEI-flavored XML with a minimal header.
    XmlTei,
}

/// Configuration options for content extraction.
///
/// All fields are public for easy configuration. Use
/// `Default::default()` for standard settings.
///
/// # Example
///
/// ```rust
/// use textharvest::ExtractionOptions;
///
/// let options = ExtractionOptions {
///     include_comments: true,
///     favor_precision: true,
///     ..ExtractionOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExtractionOptions {
    /// Extract the comment section along with the main text.
    ///
    /// Default: `false`
    pub include_comments: bool,

    /// Take information within HTML `<table>` elements into account.
    ///
    /// Default: `true`
    pub include_tables: bool,

    /// Keep image references (`graphic` elements) in the output.
    ///
    /// Default: `false`
    pub include_images: bool,

    /// Keep link targets on `ref` elements.
    ///
    /// Default: `false`
    pub include_links: bool,

    /// Render formatting in text output (Markdown-style markers) and
    /// retain it through the sanitizer.
    ///
    /// Default: `false`
    pub include_formatting: bool,

    /// Prefer less text but correct extraction.
    ///
    /// Default: `false`
    pub favor_precision: bool,

    /// Prefer more text even when unsure.
    ///
    /// Default: `false`
    pub favor_recall: bool,

    /// Skip the fallback extractors (readability and the paragraph
    /// classifier) entirely.
    ///
    /// Default: `false`
    pub no_fallback: bool,

    /// Remove duplicate text segments and duplicate documents.
    ///
    /// Default: `false`
    pub deduplicate: bool,

    /// Only keep documents featuring all essential metadata
    /// (date, title, url).
    ///
    /// Default: `false`
    pub only_with_metadata: bool,

    /// Discard documents whose declared language disagrees
    /// (ISO 639-1 code).
    ///
    /// Default: `None`
    pub target_language: Option<String>,

    /// Discard documents whose body grows beyond this many direct
    /// children after simplification.
    ///
    /// Default: `None`
    pub max_tree_size: Option<usize>,

    /// Source URL of the document, used for metadata.
    ///
    /// Default: `None`
    pub url: Option<String>,

    /// Record id attached to the output metadata.
    ///
    /// Default: `None`
    pub record_id: Option<String>,

    /// Canonical URLs to filter out.
    ///
    /// Default: empty
    pub url_blacklist: HashSet<String>,

    /// Author names to filter out (case-insensitive substring match).
    ///
    /// Default: empty
    pub author_blacklist: Vec<String>,

    /// Threshold below which custom extraction is considered weak and
    /// fallback extraction is tried (character count).
    ///
    /// Default: `250`
    pub min_extracted_size: usize,

    /// Threshold for comments to be considered present (characters).
    ///
    /// Default: `1`
    pub min_extracted_comm_size: usize,

    /// Final rejection threshold for body text (characters).
    ///
    /// Default: `1`
    pub min_output_size: usize,

    /// Final rejection threshold when only comments remain.
    ///
    /// Default: `1`
    pub min_output_comm_size: usize,

    /// Minimum segment length before the duplicate test applies.
    ///
    /// Default: `100`
    pub min_duplicate_check_size: usize,

    /// How many times a segment may repeat before being dropped.
    ///
    /// Default: `2`
    pub max_repetitions: usize,

    /// Capacity of the deduplication cache.
    ///
    /// Default: `1024`
    pub dedup_cache_size: usize,

    /// Length-ratio threshold used by the arbiter when comparing the
    /// custom extraction against a fallback extractor.
    ///
    /// Default: `2`
    pub fallback_ratio: usize,

    /// Multiplier of `min_extracted_size` above which a recall-favoring
    /// extraction bypasses the arbiter.
    ///
    /// Default: `10`
    pub confidence_factor: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            include_comments: false,
            include_tables: true,
            include_images: false,
            include_links: false,
            include_formatting: false,
            favor_precision: false,
            favor_recall: false,
            no_fallback: false,
            deduplicate: false,
            only_with_metadata: false,
            target_language: None,
            max_tree_size: None,
            url: None,
            record_id: None,
            url_blacklist: HashSet::new(),
            author_blacklist: Vec::new(),
            min_extracted_size: 250,
            min_extracted_comm_size: 1,
            min_output_size: 1,
            min_output_comm_size: 1,
            min_duplicate_check_size: 100,
            max_repetitions: 2,
            dedup_cache_size: 1024,
            fallback_ratio: 2,
            confidence_factor: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_thresholds() {
        let opts = ExtractionOptions::default();

        assert!(!opts.include_comments);
        assert!(opts.include_tables);
        assert!(!opts.include_images);
        assert!(!opts.include_links);
        assert!(!opts.include_formatting);
        assert!(!opts.favor_precision);
        assert!(!opts.favor_recall);
        assert!(!opts.no_fallback);
        assert!(!opts.deduplicate);
        assert!(!opts.only_with_metadata);
        assert!(opts.target_language.is_none());
        assert!(opts.max_tree_size.is_none());
        assert!(opts.url.is_none());
        assert!(opts.record_id.is_none());
        assert!(opts.url_blacklist.is_empty());
        assert!(opts.author_blacklist.is_empty());
        assert_eq!(opts.min_extracted_size, 250);
        assert_eq!(opts.min_extracted_comm_size, 1);
        assert_eq!(opts.min_output_size, 1);
        assert_eq!(opts.min_output_comm_size, 1);
        assert_eq!(opts.min_duplicate_check_size, 100);
        assert_eq!(opts.max_repetitions, 2);
        assert_eq!(opts.dedup_cache_size, 1024);
        assert_eq!(opts.fallback_ratio, 2);
        assert_eq!(opts.confidence_factor, 10);
    }

    #[test]
    fn test_output_format_default_is_txt() {
        assert_eq!(OutputFormat::default(), OutputFormat::Txt);
    }

    #[test]
    fn test_custom_thresholds() {
        let opts = ExtractionOptions {
            min_extracted_size: 500,
            fallback_ratio: 3,
            confidence_factor: 5,
            ..ExtractionOptions::default()
        };

        assert_eq!(opts.min_extracted_size, 500);
        assert_eq!(opts.fallback_ratio, 3);
        assert_eq!(opts.confidence_factor, 5);
    }
}
