//! # textharvest
//!
//! Web content extraction library: pulls the editorial content
//! (article body, and optionally reader comments) out of an HTML
//! document, discarding navigation, sidebars, advertisements and other
//! boilerplate.
//!
//! Extraction produces a normalized tree of editorial blocks
//! (paragraphs, headings, lists, tables, quotes, figures) together
//! with a flat text projection, and can serialize it as plain text,
//! CSV, JSON, XML or TEI-XML.
//!
//! ## Quick Start
//!
//! ```rust
//! use textharvest::extract;
//!
//! let html = r#"<html><body><article>
//!     <p>Main content of the page, long enough to matter.</p>
//! </article></body></html>"#;
//!
//! if let Some(text) = extract(html) {
//!     println!("{text}");
//! }
//! ```
//!
//! ## How it works
//!
//! The pipeline converts the document into an internal element
//! vocabulary, strips noise, locates the main content region through a
//! ranked list of rules, prunes link-dense boilerplate, rewrites the
//! candidate subtree element by element, and arbitrates against two
//! generic fallback extractors when the result looks weak. Documents
//! that stay below the size thresholds, fail the language gate or turn
//! out to be duplicates yield `None` instead of an error.

mod convert;
mod error;
mod options;
mod patterns;
mod result;

/// Element tree with the text/tail model.
pub mod etree;

/// HTML ingestion (parsing into the internal tree).
pub mod html;

/// Cleaning, pruning and the text-node cleaner.
pub mod html_processing;

/// Link density testing for boilerplate detection.
pub mod link_density;

/// LRU cache for text deduplication.
pub mod lru;

/// Language checks, duplicate detection, fingerprinting.
pub mod filters;

/// Selector rules for content, comments and discards.
pub mod selector;

/// The extraction pipeline: state, element policies, candidate
/// selection, comments, fallbacks.
pub mod extractor;

/// Metadata extraction.
pub mod metadata;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Output serialization.
pub mod xml;

use dom_query::Document;
use log::{debug, info, warn};

use crate::extractor::comments::extract_comments;
use crate::extractor::fallback::{baseline_into, compare_extraction, enforce_vocabulary};
use crate::extractor::pipeline::extract_content;
use crate::extractor::state::ExtractionState;
use crate::filters::{check_html_lang, content_fingerprint, duplicate_test, language_filter};
use crate::html::load_html;
use crate::html_processing::{prune_unwanted_nodes, tree_cleaning};
use crate::selector::discard::REMOVE_COMMENTS_RULES;

// Public API - re-exports
pub use error::{Error, Result};
pub use metadata::Metadata;
pub use options::{ExtractionOptions, OutputFormat};
pub use result::ExtractedDocument;

/// Extract the main content of an HTML document as plain text, using
/// default options.
///
/// Returns `None` when the document is rejected (unparseable, too
/// small, wrong language).
#[must_use]
pub fn extract(html: &str) -> Option<String> {
    extract_with_options(html, &ExtractionOptions::default(), OutputFormat::Txt, false)
}

/// Extract the main content of an HTML document and serialize it in
/// the chosen format.
#[must_use]
pub fn extract_with_options(
    html: &str,
    opts: &ExtractionOptions,
    format: OutputFormat,
    tei_validation: bool,
) -> Option<String> {
    let document = extract_document(html, opts)?;
    Some(xml::determine_returnstring(&document, format, tei_validation))
}

/// Extract from raw bytes with automatic encoding detection.
#[must_use]
pub fn extract_bytes(html: &[u8]) -> Option<String> {
    let decoded = encoding::transcode_to_utf8(html);
    extract(&decoded)
}

/// Extract from raw bytes with custom options and output format.
#[must_use]
pub fn extract_bytes_with_options(
    html: &[u8],
    opts: &ExtractionOptions,
    format: OutputFormat,
    tei_validation: bool,
) -> Option<String> {
    let decoded = encoding::transcode_to_utf8(html);
    extract_with_options(&decoded, opts, format, tei_validation)
}

/// Baseline extraction: JSON-LD `articleBody`, `<article>` text, then
/// unique block texts. Returns the flattened text and its length.
#[must_use]
pub fn baseline(html: &str) -> (String, usize) {
    let mut tree = etree::Tree::new();
    let (_body, text) = baseline_into(&mut tree, html);
    let len = text.chars().count();
    (text, len)
}

/// Run the full extraction pipeline and return the native result
/// object, or `None` on rejection.
///
/// Rejection reasons (input-invalid, too-small, too-large, duplicate,
/// wrong-language) never surface as errors: they are logged and all
/// converge on `None`.
#[must_use]
pub fn extract_document(html: &str, opts: &ExtractionOptions) -> Option<ExtractedDocument> {
    match bare_extraction(html, opts) {
        Ok(document) => Some(document),
        Err(err) => {
            info!("discarding document: {err}");
            None
        }
    }
}

/// The extraction pipeline proper: parse, clean and convert the
/// document, extract comments and main content, arbitrate against the
/// fallback extractors, and apply the final size, duplicate and
/// language filters.
#[allow(clippy::too_many_lines)]
fn bare_extraction(html: &str, opts: &ExtractionOptions) -> Result<ExtractedDocument> {
    let Some((mut tree, root)) = load_html(html) else {
        return Err(Error::ParseError("empty HTML document".to_string()));
    };

    // metadata and the language precheck read the parsed document
    // before any cleaning
    let doc = Document::from(html);
    if let Some(target) = &opts.target_language {
        if !check_html_lang(&doc, target) {
            return Err(Error::ExtractionError(
                "wrong HTML meta language".to_string(),
            ));
        }
    }

    let mut meta = metadata::extract_metadata(&doc, opts);
    if let Some(url) = &meta.url {
        if opts.url_blacklist.contains(url) {
            return Err(Error::ExtractionError(format!("blacklisted URL: {url}")));
        }
    }
    if opts.only_with_metadata
        && (meta.date.is_none() || meta.title.is_none() || meta.url.is_none())
    {
        return Err(Error::ExtractionError(
            "missing essential metadata".to_string(),
        ));
    }

    tree_cleaning(&mut tree, root, opts);
    convert::convert_tags(&mut tree, root, opts);

    // untouched copy for the fallback extractors
    let backup = (!opts.no_fallback).then(|| tree.deep_copy(root));

    let mut state = ExtractionState::new(opts);

    // comments first, then remove them from the tree
    let (comments_body, comments_text) = if opts.include_comments {
        let (body, text) = extract_comments(&mut tree, root, &mut state, opts);
        (Some(body), text)
    } else {
        if opts.favor_precision {
            prune_unwanted_nodes(&mut tree, root, REMOVE_COMMENTS_RULES);
        }
        (None, String::new())
    };

    let (mut body, mut text, sure_thing) = extract_content(&mut tree, root, &mut state, opts);

    if opts.include_images {
        // image carriers left empty after enumeration
        for carrier in tree.iter_tags(body, &["figure", "picture", "source"]) {
            if tree.child_count(carrier) == 0 {
                tree.remove(carrier);
            }
        }
    }

    if let Some(backup) = backup {
        let (chosen_body, chosen_text) =
            compare_extraction(&mut tree, html, backup, body, text, opts);
        body = chosen_body;
        text = chosen_text;
        if tree.child_count(body) == 0 {
            let (baseline_body, baseline_text) = baseline_into(&mut tree, html);
            body = baseline_body;
            text = baseline_text;
        }
    } else if !sure_thing && text.chars().count() < opts.min_extracted_size {
        let (baseline_body, baseline_text) = baseline_into(&mut tree, html);
        body = baseline_body;
        text = baseline_text;
        debug!("non-clean extracted length: {}", text.chars().count());
    }

    enforce_vocabulary(&mut tree, body);

    // tree size sanity check
    if let Some(max_size) = opts.max_tree_size {
        if tree.child_count(body) > max_size {
            warn!("output tree too long: {}", tree.child_count(body));
            tree.strip_tags(body, &["hi"]);
        }
        if tree.child_count(body) > max_size {
            return Err(Error::ExtractionError(format!(
                "output tree too long: {}",
                tree.child_count(body)
            )));
        }
    }

    // size checks
    let len_text = text.chars().count();
    let len_comments = comments_text.chars().count();
    if len_comments < opts.min_extracted_comm_size {
        info!("not enough comments");
    }
    if len_text < opts.min_output_size && len_comments < opts.min_output_comm_size {
        debug!("text and comments not long enough: {len_text} {len_comments}");
        return Err(Error::NoContent);
    }

    // duplicates at body level
    if opts.deduplicate {
        if let Some(cache) = state.cache.as_mut() {
            if duplicate_test(&tree.text_content(body), cache, opts) {
                return Err(Error::ExtractionError("duplicate document".to_string()));
            }
        }
    }

    // sanity check on language
    if let Some(target) = &opts.target_language {
        if language_filter(&text, &comments_text, target, meta.language.as_deref()) {
            return Err(Error::ExtractionError("wrong language".to_string()));
        }
    }

    xml::prune_empty_output(&mut tree, body);
    if let Some(comments) = comments_body {
        xml::prune_empty_output(&mut tree, comments);
    }

    meta.id = opts.record_id.clone();
    meta.fingerprint = Some(content_fingerprint(&text));

    let body_text = xml::xmltotxt(&tree, body, opts.include_formatting, opts.include_links);
    let comments_projection = comments_body
        .map(|comments| xml::xmltotxt(&tree, comments, opts.include_formatting, opts.include_links))
        .unwrap_or_default();

    Ok(ExtractedDocument::new(
        meta,
        text,
        body_text,
        comments_projection,
        tree,
        body,
        comments_body,
    ))
}
