//! Fallback extraction and the arbiter.
//!
//! When the custom extraction looks weak, its result is compared
//! against a readability-style extractor (via `dom_smoothie`, behind
//! the `readability` feature) and a paragraph classifier, using length
//! heuristics with configurable ratios. A last-resort baseline scrapes
//! JSON-LD `articleBody` payloads, `<article>` text and unique block
//! texts.

use std::collections::HashSet;

use dom_query::{Document, Selection};
use log::{debug, info};
use serde_json::Value;

use crate::convert::convert_tags;
use crate::etree::{NodeId, Tree};
use crate::html::parse_fragment_into;
use crate::html_processing::{text_chars_test, tree_cleaning, trim};
use crate::options::ExtractionOptions;

use super::OUTPUT_VOCABULARY;

/// Tags that betray an unsanitized (non-custom) extraction result.
static SANITIZE_SIGNATURE: [&str; 19] = [
    "aside", "audio", "button", "fieldset", "figure", "footer", "iframe", "input", "label",
    "link", "nav", "noindex", "noscript", "object", "option", "select", "source", "svg", "time",
];

/// Does the body still contain page chrome that only a generic
/// extractor would have kept?
#[must_use]
pub fn has_sanitize_signature(tree: &Tree, body: NodeId) -> bool {
    tree.descendants(body)
        .into_iter()
        .any(|id| SANITIZE_SIGNATURE.contains(&tree.tag(id)))
}

/// Hoist everything outside the output vocabulary, keeping its text.
pub fn enforce_vocabulary(tree: &mut Tree, body: NodeId) {
    let mut foreign: Vec<String> = Vec::new();
    for id in tree.descendants(body) {
        let tag = tree.tag(id);
        if !OUTPUT_VOCABULARY.contains(&tag) && !foreign.iter().any(|t| t == tag) {
            foreign.push(tag.to_string());
        }
    }
    if !foreign.is_empty() {
        let names: Vec<&str> = foreign.iter().map(String::as_str).collect();
        tree.strip_tags(body, &names);
    }
}

/// Normalize a generic extractor's body: clean, convert to the
/// internal vocabulary, drop toggled-off element classes. Returns the
/// flattened text.
pub fn sanitize_tree(tree: &mut Tree, body: NodeId, opts: &ExtractionOptions) -> String {
    tree_cleaning(tree, body, opts);
    convert_tags(tree, body, opts);
    if !opts.include_formatting {
        tree.strip_tags(body, &["hi", "del"]);
    }
    if !opts.include_links {
        tree.strip_tags(body, &["ref"]);
    }
    if !opts.include_images {
        tree.strip_elements(body, &["graphic"]);
    }
    if !opts.include_tables {
        tree.strip_elements(body, &["table"]);
    }
    enforce_vocabulary(tree, body);
    trim(&tree.text_content(body))
}

#[cfg(feature = "readability")]
fn readability_content(html: &str) -> Option<String> {
    use dom_smoothie::Readability;

    let doc = Document::from(html);
    let mut reader = Readability::with_document(doc, None, None).ok()?;
    let article = reader.parse().ok()?;
    Some(article.content.to_string())
}

#[cfg(not(feature = "readability"))]
fn readability_content(_html: &str) -> Option<String> {
    None
}

/// Run the readability-style extractor over the original document and
/// fold its result into the tree.
fn try_readability_into(tree: &mut Tree, html: &str) -> Option<(NodeId, String)> {
    let content = readability_content(html)?;
    let body = parse_fragment_into(tree, &content);
    let text = trim(&tree.text_content(body));
    if text.is_empty() {
        return None;
    }
    Some((body, text))
}

fn has_block_ancestor(tree: &Tree, root: NodeId, id: NodeId) -> bool {
    let mut current = tree.parent(id);
    while let Some(node) = current {
        if node == root {
            return false;
        }
        if matches!(tree.tag(node), "p" | "item" | "quote" | "code") {
            return true;
        }
        current = tree.parent(node);
    }
    false
}

/// Paragraph-classifier fallback: walk the block elements of the
/// backup tree, keep the ones that read like body text (long enough,
/// not link-dominated), and build a fresh body of paragraphs.
pub fn paragraph_rescue(
    tree: &mut Tree,
    backup: NodeId,
    _opts: &ExtractionOptions,
) -> Option<(NodeId, String)> {
    const MIN_BLOCK_LEN: usize = 25;
    const MAX_BLOCK_LINK_SHARE: f64 = 0.5;

    let mut kept: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for block in tree.iter_tags(backup, &["p", "item", "quote", "code"]) {
        if has_block_ancestor(tree, backup, block) {
            continue;
        }
        let text = trim(&tree.text_content(block));
        let len = text.chars().count();
        if len < MIN_BLOCK_LEN || !text_chars_test(&text) {
            continue;
        }
        let link_len: usize = tree
            .iter_tags(block, &["ref"])
            .into_iter()
            .map(|link| trim(&tree.text_content(link)).chars().count())
            .sum();
        if (link_len as f64) > (len as f64) * MAX_BLOCK_LINK_SHARE {
            continue;
        }
        if !seen.insert(text.clone()) {
            continue;
        }
        kept.push(text);
    }

    if kept.is_empty() {
        return None;
    }
    let body = tree.new_element("body");
    for text in &kept {
        let p = tree.sub_element(body, "p");
        tree.set_text(p, Some(text.clone()));
    }
    let text = trim(&kept.join(" "));
    Some((body, text))
}

/// Decide between the custom extraction and the generic extractors.
///
/// Implements the length-heuristic decision table, the
/// paragraph-classifier rescue and the sanitizer pass for adopted
/// generic results. `backup` is the untouched post-conversion copy of
/// the document; `original_html` feeds the readability extractor.
pub fn compare_extraction(
    tree: &mut Tree,
    original_html: &str,
    backup: NodeId,
    body: NodeId,
    text: String,
    opts: &ExtractionOptions,
) -> (NodeId, String) {
    let len_text = text.chars().count();
    let min_size = opts.min_extracted_size;
    let ratio = opts.fallback_ratio;

    // confident recall extractions bypass the arbiter
    if opts.favor_recall && len_text > min_size * opts.confidence_factor {
        return (body, text);
    }

    let readability = try_readability_into(tree, original_html);
    let (algo_body, algo_text) = match readability {
        Some((algo_body, algo_text)) => (Some(algo_body), algo_text),
        None => (None, String::new()),
    };
    let len_algo = algo_text.chars().count();
    debug!("extracted length: {len_algo} (algorithm) {len_text} (extraction)");

    let algo_flag = if len_algo == 0 || len_algo == len_text {
        false
    } else if len_text == 0 && len_algo > 0 {
        true
    } else if len_text > ratio * len_algo {
        false
    } else if len_algo > ratio * len_text {
        true
    } else {
        let has_block_text = tree
            .iter_tags(body, &["p", "quote"])
            .into_iter()
            .any(|id| text_chars_test(&tree.text_content(id)));
        let n_tables = tree.iter_tags(body, &["table"]).len();
        let n_paragraphs = tree.iter_tags(body, &["p"]).len();
        (!has_block_text && len_algo > min_size * 2)
            || (n_tables > n_paragraphs && len_algo > min_size * 2)
    };

    let (mut cur_body, mut cur_text) = match (algo_flag, algo_body) {
        (true, Some(algo_body)) => {
            info!("using generic algorithm");
            (algo_body, algo_text)
        }
        _ => {
            info!("using custom extraction");
            (body, text)
        }
    };
    let mut rescued = false;
    let cur_len = cur_text.chars().count();

    if has_sanitize_signature(tree, cur_body) && cur_len < min_size * opts.confidence_factor {
        if let Some((rescue_body, rescue_text)) = paragraph_rescue(tree, backup, opts) {
            let rescue_len = rescue_text.chars().count();
            rescued = true;
            if cur_len <= ratio * rescue_len {
                debug!("adopting paragraph classifier, length: {rescue_len}");
                cur_body = rescue_body;
                cur_text = rescue_text;
            }
        }
    } else if cur_len < min_size || opts.favor_recall {
        if let Some((rescue_body, rescue_text)) = paragraph_rescue(tree, backup, opts) {
            let rescue_len = rescue_text.chars().count();
            if rescue_len > cur_len {
                rescued = true;
                cur_body = rescue_body;
                cur_text = rescue_text;
            }
        }
    }

    if algo_flag && !rescued {
        cur_text = sanitize_tree(tree, cur_body, opts);
    }
    (cur_body, cur_text)
}

fn find_article_body(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            for (key, entry) in map {
                if key.eq_ignore_ascii_case("articlebody") {
                    if let Value::String(body) = entry {
                        if !body.trim().is_empty() {
                            return Some(body.clone());
                        }
                    }
                }
            }
            map.values().find_map(find_article_body)
        }
        Value::Array(items) => items.iter().find_map(find_article_body),
        _ => None,
    }
}

/// Last-resort scrape over JSON-LD payloads, the `<article>` element
/// and unique block-level texts. Builds the result into `tree` and
/// returns the body with its flattened text.
pub fn baseline_into(tree: &mut Tree, html: &str) -> (NodeId, String) {
    let post_body = tree.new_element("body");
    if html.trim().is_empty() {
        return (post_body, String::new());
    }
    let doc = Document::from(html);

    // structured data first
    for node in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
        let sel = Selection::from(*node);
        let payload = sel.text().to_string();
        if payload.trim().is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(&payload) else {
            continue;
        };
        if let Some(article_body) = find_article_body(&value) {
            let text = trim(&article_body);
            if !text.is_empty() {
                let p = tree.sub_element(post_body, "p");
                tree.set_text(p, Some(text.clone()));
                return (post_body, text);
            }
        }
    }

    // article element
    if let Some(node) = doc.select("article").nodes().first() {
        let text = trim(&node.text());
        if !text.is_empty() {
            let p = tree.sub_element(post_body, "p");
            tree.set_text(p, Some(text.clone()));
            return (post_body, text);
        }
    }

    // unique text of block elements
    let mut seen: HashSet<String> = HashSet::new();
    for node in doc.select("blockquote, code, p, pre, q, quote").nodes() {
        let sel = Selection::from(*node);
        let entry = trim(&sel.text());
        if entry.is_empty() || !seen.insert(entry.clone()) {
            continue;
        }
        let p = tree.sub_element(post_body, "p");
        tree.set_text(p, Some(entry));
    }
    let text = trim(&tree.itertext(post_body).join(" "));
    (post_body, text)
}
