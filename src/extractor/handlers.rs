//! Element policies: the per-tag rewriting rules that turn candidate
//! subtrees into normalized output.
//!
//! The hardest case is paragraph rewriting, which recurses with a
//! small immutable [`RewriteContext`] and reconstructs inter-element
//! whitespace through a pair of bidirectional predicates. All other
//! policies (headings, lists, quotes, tables, images, formatting) are
//! dispatched from [`handle_text_elem`].

use log::{debug, info};

use crate::etree::{NodeId, Tree};
use crate::html_processing::{
    clean_element_text, handle_textnode, log_dropped, process_node, text_chars_test, trim_opt,
    TextFlags,
};
use crate::options::ExtractionOptions;
use crate::patterns::IMAGE_EXTENSION;

use super::state::ExtractionState;
use super::{
    CODES_QUOTES, FORMATTING, FORMATTING_PROTECTED, HEADINGS, P_FORMATTING, TABLE_ALL,
    TABLE_ELEMS,
};

// === Whitespace reconstruction ===

/// Whether text starting with `s` wants a space before it. Empty or
/// absent text does; text opening with a space or closing punctuation
/// does not.
#[must_use]
pub fn should_have_space_prior(s: Option<&str>) -> bool {
    let Some(s) = s else { return true };
    let Some(c) = s.chars().next() else { return true };
    if c == ' ' {
        return false;
    }
    !matches!(c, '.' | '?' | '!' | ',' | ':' | ';' | ')')
}

/// Whether text ending with `s` wants a space after it. Empty or
/// absent text does; text closing with a space or an opening bracket
/// does not.
#[must_use]
pub fn should_have_space_next(s: Option<&str>) -> bool {
    let Some(s) = s else { return true };
    let Some(c) = s.chars().last() else { return true };
    if c == ' ' {
        return false;
    }
    !matches!(c, '[' | '(')
}

/// The single joining predicate: insert a space between a left text
/// run and the right-hand text only when both sides agree.
#[must_use]
pub fn insert_joining_space(left_tail: Option<&str>, right_head: Option<&str>) -> bool {
    should_have_space_next(left_tail) && should_have_space_prior(right_head)
}

/// Last text run of an element: its tail, else the last child's last
/// text, else its own text.
fn get_last_text(tree: &Tree, id: NodeId) -> Option<String> {
    if let Some(tail) = tree.tail(id).filter(|t| !t.is_empty()) {
        return Some(tail.to_string());
    }
    if let Some(last) = tree.last_child(id) {
        if let Some(text) = get_last_text(tree, last) {
            return Some(text);
        }
    }
    tree.text(id)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

enum InlineProbe {
    /// A block boundary was hit; no inline text flows out of it.
    Block,
    Found(String),
    Missing,
}

fn first_inline(tree: &Tree, id: NodeId, is_root: bool) -> InlineProbe {
    if !is_root && matches!(tree.tag(id), "graphic" | "div" | "p") {
        return InlineProbe::Block;
    }
    if let Some(text) = tree.text(id).filter(|t| !t.is_empty()) {
        return InlineProbe::Found(text.to_string());
    }
    if let Some(first) = tree.first_child(id) {
        match first_inline(tree, first, false) {
            InlineProbe::Block => return InlineProbe::Block,
            InlineProbe::Found(text) => return InlineProbe::Found(text),
            InlineProbe::Missing => {}
        }
    }
    match tree
        .text(id)
        .or_else(|| tree.tail(id))
        .filter(|t| !t.is_empty())
    {
        Some(text) => InlineProbe::Found(text.to_string()),
        None => InlineProbe::Missing,
    }
}

/// First inline text of an element, used to decide whether the
/// previous sibling needs a trailing space. Block children (`p`,
/// `div`, `graphic`) contribute none.
#[must_use]
pub fn get_first_inline_text(tree: &Tree, id: NodeId) -> Option<String> {
    match first_inline(tree, id, true) {
        InlineProbe::Found(text) => Some(text),
        _ => None,
    }
}

/// An empty placeholder: no children, no text, no tail, and a tag
/// whose empty form carries no meaning.
fn element_is_empty(tree: &Tree, id: NodeId) -> bool {
    tree.child_count(id) == 0
        && tree.text(id).is_none()
        && tree.tail(id).is_none()
        && matches!(tree.tag(id), "p" | "span" | "div" | "hi" | "head")
}

/// Append a rewritten child to `parent`, inserting a joining space
/// into the previous element's tail when both sides want one.
/// Enumerable containers are unwrapped: their children land directly
/// in `parent`.
pub fn append_child(
    tree: &mut Tree,
    parent: NodeId,
    res: Option<NodeId>,
    last_element: Option<NodeId>,
    state: &ExtractionState,
) -> Option<NodeId> {
    let Some(res) = res else { return last_element };
    if element_is_empty(tree, res) {
        return last_element;
    }

    if state.is_enumerable(tree.tag(res)) {
        let mut last = last_element;
        for child in tree.children(res) {
            tree.append(parent, child);
            last = Some(child);
        }
        return last;
    }

    if let Some(last) = last_element {
        let first_text = get_first_inline_text(tree, res);
        let last_text = get_last_text(tree, last);
        if insert_joining_space(last_text.as_deref(), first_text.as_deref()) {
            let tail = format!("{} ", tree.tail(last).unwrap_or(""));
            tree.set_tail(last, Some(tail));
        }
    }
    tree.append(parent, res);
    Some(res)
}

/// Per-call flags threaded through paragraph rewriting.
#[derive(Debug, Clone, Default)]
pub struct RewriteContext {
    pub is_root: bool,
    pub is_last_of_root: bool,
    pub has_tail: bool,
    pub next_text: Option<String>,
    pub parent_tag: Option<String>,
}

impl RewriteContext {
    /// Context for the root of a paragraph rewrite.
    #[must_use]
    pub fn root() -> Self {
        Self {
            is_root: true,
            ..Self::default()
        }
    }
}

// === Paragraph rewriting ===

/// Recursively rewrite a paragraph-context element into the output
/// vocabulary, reconstructing whitespace.
///
/// Elements whose tag is neither permitted nor enumerable are dropped
/// together with their text and logged at debug level.
#[allow(clippy::too_many_lines)]
pub fn handle_paragraphs_child(
    tree: &mut Tree,
    child: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
    ctx: &RewriteContext,
) -> Option<NodeId> {
    let child_tag = tree.tag(child).to_string();
    let processed = tree.new_element(&child_tag);
    let text = clean_element_text(tree, child, false);
    let tail = clean_element_text(tree, child, true);
    tree.set_text(processed, text);
    tree.set_tail(processed, tail);

    if child_tag == "table" {
        return handle_table(tree, child, state, opts);
    } else if P_FORMATTING.contains(&child_tag.as_str())
        || FORMATTING.contains(&child_tag.as_str())
        || HEADINGS.contains(&child_tag.as_str())
        || matches!(child_tag.as_str(), "p" | "div")
    {
        if matches!(child_tag.as_str(), "hi" | "head") {
            if let Some(rend) = tree.attr(child, "rend").map(str::to_string) {
                tree.set_attr(processed, "rend", &rend);
            }
        } else if child_tag == "ref" {
            let target = tree
                .attr(child, "target")
                .or_else(|| tree.attr(child, "href"))
                .map(str::to_string);
            if let Some(target) = target {
                tree.set_attr(processed, "target", &target);
            }
        }
        // inline runs keep their raw spacing until the final trim
        let raw_text = tree.text(child).map(str::to_string);
        let raw_tail = tree.tail(child).map(str::to_string);
        tree.set_text(processed, raw_text);
        tree.set_tail(processed, raw_tail);
    } else if child_tag == "graphic" && state.is_potential("graphic") {
        let image = handle_image(tree, child)?;
        tree.set_tag(child, "done");
        return Some(image);
    } else if !state.is_potential(&child_tag) && !state.is_enumerable(&child_tag) {
        info!("removing element {child_tag}");
        return None;
    }

    if tree.tag(processed) == "div"
        && tree
            .text(processed)
            .is_some_and(|t| !t.trim().is_empty())
    {
        tree.set_tag(processed, "p");
    }

    if element_is_empty(tree, child) {
        return None;
    }
    tree.set_tag(child, "done");

    let children = tree.children(child);
    let child_len = children.len();
    let mut is_last_of_root = ctx.is_last_of_root;
    if child_len == 0 && ctx.is_root {
        is_last_of_root = true;
    }

    let mut last_element = Some(processed);
    for (i, &c) in children.iter().enumerate() {
        let c_tag = tree.tag(c).to_string();
        let next_text = children
            .get(i + 1)
            .and_then(|&n| get_first_inline_text(tree, n));
        let sub_ctx = RewriteContext {
            is_root: false,
            is_last_of_root: ctx.is_root && i == child_len - 1,
            has_tail: ctx.has_tail || i < child_len - 1 || tree.tail(processed).is_some(),
            next_text,
            parent_tag: Some(tree.tag(processed).to_string()),
        };

        if state.is_enumerable(&c_tag) {
            for ce in tree.children(c) {
                let res = handle_paragraphs_child(tree, ce, state, opts, &sub_ctx);
                last_element = append_child(tree, processed, res, last_element, state);
            }
            continue;
        }

        if !state.is_potential(&c_tag) {
            if c_tag != "done" {
                log_dropped(tree, c, Some(tree.tag(processed)));
            }
            continue;
        }

        let res = handle_paragraphs_child(tree, c, state, opts, &sub_ctx);
        last_element = append_child(tree, processed, res, last_element, state);
    }

    let text = trim_opt(tree.text(processed));
    tree.set_text(processed, text);
    let tail = trim_opt(tree.tail(processed));
    tree.set_tail(processed, tail);

    // a tail directly following text or children is set off by a space
    if tree.tail(processed).is_some()
        && (tree.text(processed).is_some() || tree.child_count(processed) > 0)
        && should_have_space_prior(tree.tail(processed))
        && should_have_space_next(tree.text(processed))
    {
        if let Some(tail) = tree.tail(processed).map(str::to_string) {
            tree.set_tail(processed, Some(format!(" {tail}")));
        }
    }

    // text followed by children keeps its separating space
    if tree.text(processed).is_some()
        && tree.child_count(processed) > 0
        && should_have_space_next(tree.text(processed))
    {
        if let Some(text) = tree.text(processed).map(str::to_string) {
            tree.set_text(processed, Some(format!("{text} ")));
        }
    }

    if !ctx.has_tail
        && tree.tail(processed).is_none()
        && tree.text(processed).is_some()
        && ((!ctx.is_root && !is_last_of_root) || tree.child_count(processed) > 0)
        && should_have_space_next(tree.text(processed))
    {
        if let Some(text) = tree.text(processed).map(str::to_string) {
            tree.set_text(processed, Some(format!("{text} ")));
        }
    } else if tree.tail(processed).is_some()
        && !is_last_of_root
        && !ctx.is_root
        && should_have_space_next(tree.tail(processed))
        && should_have_space_prior(ctx.next_text.as_deref())
    {
        if let Some(tail) = tree.tail(processed).map(str::to_string) {
            tree.set_tail(processed, Some(format!("{tail} ")));
        }
    }

    if element_is_empty(tree, processed) {
        return None;
    }
    Some(processed)
}

/// Process a paragraph element along with its children, trimming and
/// cleaning the content.
pub fn handle_paragraphs(
    tree: &mut Tree,
    element: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    tree.clear_attrs(element);

    if tree.child_count(element) == 0 {
        if process_node(tree, element, state.cache.as_mut(), opts, state.deduplicate) {
            return Some(element);
        }
        return None;
    }

    let processed = handle_paragraphs_child(tree, element, state, opts, &RewriteContext::root())?;
    if tree.child_count(processed) > 0 {
        // no trailing line break on a paragraph
        if let Some(last) = tree.last_child(processed) {
            if tree.tag(last) == "lb" {
                tree.remove(last);
            }
        }
        return Some(processed);
    }
    if tree.text(processed).is_some() {
        return Some(processed);
    }
    debug!("discarding empty rewritten paragraph");
    None
}

/// Process list elements and their items.
pub fn handle_lists(
    tree: &mut Tree,
    element: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    let tag = tree.tag(element).to_string();
    let processed = tree.new_element(&tag);
    if let Some(text) = tree.text(element).map(str::to_string) {
        tree.set_text(processed, Some(text));
    }

    for item in tree.iter_tags(element, &["item"]) {
        let res = handle_paragraphs_child(tree, item, state, opts, &RewriteContext::root());
        append_child(tree, processed, res, None, state);
        tree.set_tag(item, "done");
    }
    tree.set_tag(element, "done");

    if tree.child_count(processed) > 0 && text_chars_test(&tree.text_content(processed)) {
        Some(processed)
    } else {
        None
    }
}

/// Process block quotations and code blocks.
pub fn handle_quotes(
    tree: &mut Tree,
    element: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    let tag = tree.tag(element).to_string();
    let processed = tree.new_element(&tag);

    for node in tree.iter(element) {
        if process_node(tree, node, state.cache.as_mut(), opts, state.deduplicate) {
            let node_tag = tree.tag(node).to_string();
            let sub = tree.sub_element(processed, &node_tag);
            let text = tree.text(node).map(str::to_string);
            let tail = tree.tail(node).map(str::to_string);
            tree.set_text(sub, text);
            tree.set_tail(sub, tail);
        }
        tree.set_tag(node, "done");
    }

    if tree.child_count(processed) > 0 && text_chars_test(&tree.text_content(processed)) {
        // avoid double-wrapped quotations
        tree.strip_tags(processed, &["quote"]);
        Some(processed)
    } else {
        None
    }
}

/// Process heading elements.
pub fn handle_titles(
    tree: &mut Tree,
    element: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    if tree.child_count(element) == 0 {
        if process_node(tree, element, state.cache.as_mut(), opts, state.deduplicate)
            && tree.text(element).is_some_and(text_chars_test)
        {
            return Some(element);
        }
        return None;
    }

    let title = tree.deep_copy(element);
    let tail = tree.tail(element).map(str::to_string);
    tree.set_tail(title, tail);

    for child in tree.children(element) {
        let flags = TextFlags {
            comments_fix: false,
            deduplicate: state.deduplicate,
            preserve_spaces: false,
        };
        if handle_textnode(tree, child, flags, state.cache.as_mut(), opts) {
            tree.append(title, child);
        }
        tree.set_tag(child, "done");
    }

    if tree.text(title).is_some_and(text_chars_test) {
        Some(title)
    } else {
        None
    }
}

/// Process formatting elements found outside of paragraphs, wrapping
/// orphans so their text is not lost.
pub fn handle_formatting(
    tree: &mut Tree,
    element: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    let survived = process_node(tree, element, state.cache.as_mut(), opts, state.deduplicate);
    if tree.child_count(element) == 0 && !survived {
        return None;
    }

    let anchor = tree.parent(element).or_else(|| tree.prev_sibling(element));
    let needs_wrapping = match anchor {
        None => true,
        Some(anchor) => !FORMATTING_PROTECTED.contains(&tree.tag(anchor)),
    };

    if needs_wrapping {
        if survived {
            let wrapper = tree.new_element("p");
            tree.append(wrapper, element);
            return Some(wrapper);
        }
        return None;
    }
    survived.then_some(element)
}

/// Handle diverse or unknown elements in the scope of relevant tags.
pub fn handle_other_elements(
    tree: &mut Tree,
    element: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    let tag = tree.tag(element).to_string();
    if !state.is_potential(&tag) {
        return None;
    }

    if tag == "div" {
        let flags = TextFlags {
            comments_fix: false,
            deduplicate: state.deduplicate,
            preserve_spaces: false,
        };
        if handle_textnode(tree, element, flags, state.cache.as_mut(), opts)
            && tree.text(element).is_some_and(text_chars_test)
        {
            tree.clear_attrs(element);
            tree.set_tag(element, "p");
            return Some(element);
        }
    } else {
        debug!("unexpected element seen: {} {:?}", tag, tree.text(element));
    }
    None
}

/// Check if a source string points to an image file.
fn is_image_file(src: &str) -> bool {
    if src.is_empty() {
        return false;
    }
    let path = src.split('?').next().unwrap_or(src);
    IMAGE_EXTENSION.is_match(path)
}

/// Process an image element and its relevant attributes.
///
/// The source is selected from `data-src`, then `src`, then the first
/// `data-src*` attribute pointing at an image file. Images without a
/// usable source yield nothing.
pub fn handle_image(tree: &mut Tree, element: NodeId) -> Option<NodeId> {
    let processed = tree.new_element("graphic");

    let data_src = tree.attr(element, "data-src").map(str::to_string);
    let src = tree.attr(element, "src").map(str::to_string);
    if let Some(value) = data_src.filter(|v| is_image_file(v)) {
        tree.set_attr(processed, "src", &value);
    } else if let Some(value) = src.filter(|v| is_image_file(v)) {
        tree.set_attr(processed, "src", &value);
    } else {
        let fallback = tree
            .attrs(element)
            .iter()
            .find(|(k, v)| k.starts_with("data-src") && is_image_file(v))
            .map(|(_, v)| v.to_string());
        if let Some(value) = fallback {
            tree.set_attr(processed, "src", &value);
        }
    }

    for name in ["alt", "class", "title"] {
        if let Some(value) = tree.attr(element, name).map(str::to_string) {
            tree.set_attr(processed, name, &value);
        }
    }

    let src = tree.attr(processed, "src").map(str::to_string)?;
    if src.is_empty() {
        return None;
    }
    if let Some(stripped) = src.strip_prefix("//") {
        tree.set_attr(processed, "src", &format!("http://{stripped}"));
    }
    Some(processed)
}

/// Process a single table element into `table`/`row`/`cell` form.
///
/// Structural wrappers are stripped first; rows open on `tr`, cells on
/// `td`/`th` (`role=head`). A nested table past the first element ends
/// processing.
pub fn handle_table(
    tree: &mut Tree,
    table_elem: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    let new_table = tree.new_element("table");
    let mut new_row = tree.new_element("row");

    tree.strip_tags(table_elem, &["thead", "tbody", "tfoot"]);

    let sub_ids = tree.iter(table_elem);
    for (i, &sub) in sub_ids.iter().enumerate() {
        let sub_tag = tree.tag(sub).to_string();
        match sub_tag.as_str() {
            "tr" => {
                if tree.child_count(new_row) > 0 {
                    tree.append(new_table, new_row);
                    new_row = tree.new_element("row");
                }
            }
            "td" | "th" => {
                let cell = tree.new_element("cell");
                if sub_tag == "th" {
                    tree.set_attr(cell, "role", "head");
                }

                if tree.child_count(sub) == 0 {
                    if process_node(tree, sub, state.cache.as_mut(), opts, state.deduplicate) {
                        let text = tree.text(sub).map(str::to_string);
                        let tail = tree.tail(sub).map(str::to_string);
                        tree.set_text(cell, text);
                        tree.set_tail(cell, tail);
                    }
                } else {
                    // keep the cell's direct text, then fold descendants
                    if let Some(text) = clean_element_text(tree, sub, false) {
                        tree.set_text(cell, Some(text));
                    }
                    for child in tree.descendants(sub) {
                        let child_tag = tree.tag(child).to_string();
                        let processed_subchild = if TABLE_ALL.contains(&child_tag.as_str()) {
                            // nested cells re-emit as paragraphs so that
                            // cells only ever appear under rows
                            if TABLE_ELEMS.contains(&child_tag.as_str()) {
                                tree.set_tag(child, "p");
                            }
                            let flags = TextFlags {
                                comments_fix: true,
                                deduplicate: state.deduplicate,
                                preserve_spaces: true,
                            };
                            handle_textnode(tree, child, flags, state.cache.as_mut(), opts)
                                .then_some(child)
                        } else {
                            let had_div = state.is_potential("div");
                            state.add_potential("div");
                            let res = handle_text_elem(tree, child, state, opts);
                            if !had_div {
                                state.remove_potential("div");
                            }
                            res
                        };

                        if let Some(pc) = processed_subchild {
                            let pc_tag = tree.tag(pc).to_string();
                            let sub_child = tree.sub_element(cell, &pc_tag);
                            let text = tree.text(pc).map(str::to_string);
                            let tail = tree.tail(pc).map(str::to_string);
                            tree.set_text(sub_child, text);
                            tree.set_tail(sub_child, tail);
                        }
                        tree.set_tag(child, "done");
                    }
                }

                if tree.text(cell).is_some() || tree.child_count(cell) > 0 {
                    tree.append(new_row, cell);
                }
            }
            "table" if i > 0 => break,
            _ => {}
        }
        tree.set_tag(sub, "done");
    }

    if tree.child_count(new_row) > 0 {
        tree.append(new_table, new_row);
    }
    if tree.child_count(new_table) > 0 {
        Some(new_table)
    } else {
        None
    }
}

/// Dispatch a text element to its policy.
pub fn handle_text_elem(
    tree: &mut Tree,
    element: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    let tag = tree.tag(element).to_string();
    if CODES_QUOTES.contains(&tag.as_str()) {
        return handle_quotes(tree, element, state, opts);
    }
    if FORMATTING.contains(&tag.as_str()) {
        return handle_formatting(tree, element, state, opts);
    }
    match tag.as_str() {
        "list" => handle_lists(tree, element, state, opts),
        "head" => handle_titles(tree, element, state, opts),
        "p" => handle_paragraphs(tree, element, state, opts),
        "lb" => {
            if tree.tail(element).is_some_and(text_chars_test)
                && process_node(tree, element, state.cache.as_mut(), opts, state.deduplicate)
            {
                let tail = tree.tail(element).map(str::to_string);
                let paragraph = tree.new_element("p");
                tree.set_text(paragraph, tail);
                Some(paragraph)
            } else {
                None
            }
        }
        "table" => {
            if state.is_potential("table") {
                handle_table(tree, element, state, opts)
            } else {
                None
            }
        }
        "graphic" => {
            if state.is_potential("graphic") {
                handle_image(tree, element)
            } else {
                None
            }
        }
        _ => handle_other_elements(tree, element, state, opts),
    }
}
