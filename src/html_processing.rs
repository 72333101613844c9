//! HTML processing and pruning.
//!
//! Cleans the ingested tree before extraction (noise tags, wrapper
//! tags, discard rules), removes link-dense boilerplate and provides
//! the text-node cleaner used by every element policy.

use std::collections::HashSet;

use log::debug;

use crate::etree::{NodeId, Tree};
use crate::filters::duplicate_test;
use crate::link_density::link_density_test;
use crate::lru::LruCache;
use crate::options::ExtractionOptions;
use crate::patterns::SHARE_BUTTON_TEXT;
use crate::selector::Rule;

/// Tags removed together with their subtrees during document cleaning.
pub static TAGS_TO_CLEAN: [&str; 50] = [
    // important
    "aside", "embed", "footer", "form", "head", "iframe", "menu", "object", "script",
    // other content
    "applet", "audio", "canvas", "figure", "map", "picture", "svg", "video",
    // secondary
    "area", "blink", "button", "datalist", "dialog", "frame", "frameset", "fieldset",
    "link", "input", "ins", "label", "legend", "marquee", "math", "menuitem", "nav",
    "noscript", "optgroup", "option", "output", "param", "progress", "rp", "rt", "rtc",
    "select", "source", "style", "track", "textarea", "time", "use",
];

/// Tags removed while keeping their content.
pub static TAGS_TO_STRIP: [&str; 18] = [
    "abbr", "acronym", "address", "bdi", "bdo", "big", "cite", "data", "dfn", "font",
    "hgroup", "img", "ins", "mark", "meta", "ruby", "small", "template",
];

/// Table framework tags, stripped while keeping rows.
pub static TABLE_TAGS_TO_STRIP: [&str; 3] = ["tbody", "tfoot", "thead"];

/// Tags removed when they carry no content at all.
pub static EMPTY_TAGS_TO_REMOVE: [&str; 22] = [
    "article", "b", "blockquote", "dd", "div", "dt", "em",
    "h1", "h2", "h3", "h4", "h5", "h6", "i", "li", "main",
    "p", "pre", "q", "section", "span", "strong",
];

/// Collapse whitespace runs to single spaces and trim the ends.
#[must_use]
pub fn trim(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Like [`trim`], collapsing to `None` when nothing remains.
#[must_use]
pub fn trim_opt(text: Option<&str>) -> Option<String> {
    let trimmed = trim(text?);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Check if text contains any alphanumeric character.
#[must_use]
pub fn text_chars_test(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Check if a line of text is a standalone share-button or social
/// widget caption.
#[must_use]
pub fn is_share_button_line(line: &str) -> bool {
    SHARE_BUTTON_TEXT.is_match(line.trim())
}

/// Boilerplate filter over an element's own text (or tail when there
/// is no text). Returns `true` when the element should be dropped.
fn textfilter(tree: &Tree, id: NodeId) -> bool {
    let test_text = tree.text(id).or_else(|| tree.tail(id)).unwrap_or("");
    if !text_chars_test(test_text) {
        return true;
    }
    test_text.lines().any(is_share_button_line)
}

/// Flags for the text-node cleaner.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFlags {
    /// Comment-section mode: line breaks with content become
    /// paragraphs.
    pub comments_fix: bool,
    /// Apply the LRU duplicate test.
    pub deduplicate: bool,
    /// Keep whitespace as-is (code blocks, table cells).
    pub preserve_spaces: bool,
}

/// Convert, format and probe a potential text element in place.
///
/// Returns `true` when the element survives cleaning. Whitespace is
/// normalized (unless `preserve_spaces`), lone tails are promoted to
/// text, boilerplate captions and duplicate segments are rejected.
pub fn handle_textnode(
    tree: &mut Tree,
    id: NodeId,
    flags: TextFlags,
    cache: Option<&mut LruCache>,
    opts: &ExtractionOptions,
) -> bool {
    let tag = tree.tag(id).to_string();
    if tag == "done" {
        return false;
    }
    if tag == "graphic" {
        return true;
    }

    let is_leaf = tree.child_count(id) == 0;
    if tree.text(id).is_none() && tree.tail(id).is_none() && is_leaf && tag != "lb" {
        return false;
    }

    // line breaks carry their content in the tail
    if tag == "lb" {
        let tail = trim_opt(tree.tail(id));
        if flags.comments_fix {
            if let Some(t) = tail {
                tree.set_tag(id, "p");
                tree.set_text(id, Some(t));
                tree.set_tail(id, None);
                return true;
            }
            return false;
        }
        let keep = tail.as_deref().is_some_and(text_chars_test);
        tree.set_tail(id, tail);
        return keep;
    }

    // elements parsed without text inherit their tail
    if tree.text(id).is_none() {
        if let Some(tail) = tree.tail(id).map(str::to_string) {
            tree.set_text(id, Some(tail));
            tree.set_tail(id, None);
        }
    }

    if !flags.preserve_spaces {
        let text = trim_opt(tree.text(id));
        tree.set_text(id, text);
        let tail = trim_opt(tree.tail(id));
        tree.set_tail(id, tail);
    }

    if textfilter(tree, id) {
        return false;
    }

    if flags.deduplicate {
        if let Some(cache) = cache {
            let text = tree.text(id).unwrap_or("").to_string();
            if duplicate_test(&text, cache, opts) {
                return false;
            }
        }
    }

    true
}

/// Clean a leaf text element in place. Returns `true` when it still
/// carries text or tail afterwards.
pub fn process_node(
    tree: &mut Tree,
    id: NodeId,
    cache: Option<&mut LruCache>,
    opts: &ExtractionOptions,
    deduplicate: bool,
) -> bool {
    if tree.tag(id) == "done" {
        return false;
    }
    if tree.child_count(id) == 0 && tree.text(id).is_none() && tree.tail(id).is_none() {
        return false;
    }
    let flags = TextFlags {
        comments_fix: false,
        deduplicate,
        preserve_spaces: false,
    };
    if !handle_textnode(tree, id, flags, cache, opts) {
        return false;
    }
    tree.text(id).is_some() || tree.tail(id).is_some()
}

/// Trimmed text (or tail) of an element, for seeding a rewritten node.
#[must_use]
pub fn clean_element_text(tree: &Tree, id: NodeId, from_tail: bool) -> Option<String> {
    if from_tail {
        trim_opt(tree.tail(id))
    } else {
        trim_opt(tree.text(id))
    }
}

/// Remove subtrees matched by any of the given rules.
pub fn prune_unwanted_nodes(tree: &mut Tree, root: NodeId, rules: &[Rule]) {
    let mut targets = Vec::new();
    for id in tree.descendants(root) {
        if rules.iter().any(|rule| rule(tree, id)) {
            targets.push(id);
        }
    }
    for id in targets {
        tree.remove(id);
    }
}

/// Remove an element but keep its tail text attached to the flow.
fn remove_keep_tail(tree: &mut Tree, id: NodeId) {
    if let Some(tail) = tree.tail(id).map(str::to_string) {
        if let Some(prev) = tree.prev_sibling(id) {
            let merged = match tree.tail(prev) {
                Some(existing) => format!("{existing} {tail}"),
                None => tail,
            };
            tree.set_tail(prev, Some(merged));
        } else if let Some(parent) = tree.parent(id) {
            let merged = match tree.text(parent) {
                Some(existing) => format!("{existing} {tail}"),
                None => tail,
            };
            tree.set_text(parent, Some(merged));
        }
    }
    tree.remove(id);
}

/// Drop content-free elements to save later processing.
fn prune_empty(tree: &mut Tree, root: NodeId, opts: &ExtractionOptions) {
    let empty_set: HashSet<&str> = EMPTY_TAGS_TO_REMOVE.into_iter().collect();
    let keep_tail = !opts.favor_precision;

    // children before parents
    for id in tree.descendants(root).into_iter().rev() {
        if !empty_set.contains(tree.tag(id)) {
            continue;
        }
        let no_text = trim_opt(tree.text(id)).is_none();
        let no_tail = trim_opt(tree.tail(id)).is_none();
        if tree.child_count(id) == 0 && no_text {
            if no_tail || !keep_tail {
                tree.remove(id);
            } else {
                remove_keep_tail(tree, id);
            }
        }
    }
}

/// Clean the document: strip wrapper tags, remove noise subtrees,
/// apply the discard rules and drop empty elements.
///
/// Runs on the ingested tree before tag conversion, so tag names here
/// are HTML names.
pub fn tree_cleaning(tree: &mut Tree, root: NodeId, opts: &ExtractionOptions) {
    // strip wrappers first so their content survives
    let mut strip_list: Vec<&str> = TAGS_TO_STRIP.to_vec();
    strip_list.extend_from_slice(&TABLE_TAGS_TO_STRIP);
    if opts.include_images {
        strip_list.retain(|t| *t != "img");
    }
    tree.strip_tags(root, &strip_list);

    // remove noise subtrees
    let mut clean_list: Vec<&str> = TAGS_TO_CLEAN.to_vec();
    if !opts.include_tables {
        clean_list.extend_from_slice(&["table", "tr", "td", "th"]);
    }
    if opts.include_images {
        clean_list.retain(|t| !matches!(*t, "figure" | "picture" | "source"));
    }
    let clean_set: HashSet<&str> = clean_list.into_iter().collect();
    let targets: Vec<NodeId> = tree
        .descendants(root)
        .into_iter()
        .filter(|&id| clean_set.contains(tree.tag(id)))
        .collect();
    for id in targets {
        tree.remove(id);
    }

    prune_unwanted_nodes(tree, root, crate::selector::discard::DISCARD_RULES);
    if !opts.include_images {
        prune_unwanted_nodes(tree, root, crate::selector::discard::DISCARD_IMAGE_RULES);
    }

    prune_empty(tree, root, opts);
}

/// Determine the link density of elements with the given tag and
/// remove the ones identified as boilerplate.
///
/// Deletions are collected first and de-duplicated before application.
/// In backtracking mode, non-flagged elements that produced short link
/// texts are grouped by their trimmed content; groups repeated at
/// least three times with a length under 100 are deleted as repeated
/// navigation items.
pub fn delete_by_link_density(
    tree: &mut Tree,
    subtree: NodeId,
    tag_name: &str,
    backtracking: bool,
    opts: &ExtractionOptions,
) {
    let mut deletions: Vec<NodeId> = Vec::new();
    let mut grouped: Vec<(String, Vec<NodeId>)> = Vec::new();

    for elem in tree.iter_tags(subtree, &[tag_name]) {
        let (flagged, short_texts) = link_density_test(tree, elem, opts);
        if flagged {
            deletions.push(elem);
        } else if backtracking && !short_texts.is_empty() {
            let text = trim(&tree.text_content(elem));
            if let Some(entry) = grouped.iter_mut().find(|(t, _)| *t == text) {
                entry.1.push(elem);
            } else {
                grouped.push((text, vec![elem]));
            }
        }
    }

    if backtracking {
        for (text, elems) in grouped {
            let len = text.chars().count();
            if len > 0 && len < 100 && elems.len() >= 3 {
                deletions.extend(elems);
            }
        }
    }

    let mut seen: HashSet<NodeId> = HashSet::new();
    for elem in deletions {
        if seen.insert(elem) {
            tree.remove(elem);
        }
    }
}

/// Debug record for an element dropped in paragraph context.
pub fn log_dropped(tree: &Tree, id: NodeId, parent_tag: Option<&str>) {
    debug!(
        "dropping element {} in {} context: {:?}",
        tree.tag(id),
        parent_tag.unwrap_or("?"),
        tree.text(id)
    );
}
