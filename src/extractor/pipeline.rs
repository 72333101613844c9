//! Candidate selection and wild-text recovery.
//!
//! Walks the ranked body rules, prunes each candidate subtree, rewrites
//! its children and stops at the first rule producing a non-trivial
//! result. When every rule comes up short, the whole cleaned document
//! is rescanned for stray block elements.

use log::debug;

use crate::etree::{NodeId, Tree};
use crate::html_processing::{delete_by_link_density, prune_unwanted_nodes, text_chars_test, trim};
use crate::link_density::link_density_test_tables;
use crate::options::ExtractionOptions;
use crate::selector::content::BODY_RULES;
use crate::selector::discard::{DISCARD_IMAGE_RULES, DISCARD_RULES};
use crate::selector::query;

use super::handlers::{append_child, handle_paragraphs_child, handle_text_elem, RewriteContext};
use super::state::ExtractionState;
use super::HEADINGS;

/// Find the main content using the ranked body rules, then rewrite it.
///
/// Returns the result body, its flattened text and whether the result
/// came from a confident candidate match (`sure_thing`).
pub fn extract_content(
    tree: &mut Tree,
    root: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> (NodeId, String, bool) {
    let mut sure_thing = false;
    let result_body = tree.new_element("body");

    for (rule_index, rule) in BODY_RULES.iter().enumerate() {
        let Some(subtree) = query(tree, root, *rule) else {
            continue;
        };

        // prune boilerplate from the candidate
        prune_unwanted_nodes(tree, subtree, DISCARD_RULES);
        if !state.is_potential("graphic") {
            prune_unwanted_nodes(tree, subtree, DISCARD_IMAGE_RULES);
        }

        // remove link-dense elements
        delete_by_link_density(tree, subtree, "div", true, opts);
        delete_by_link_density(tree, subtree, "list", false, opts);
        delete_by_link_density(tree, subtree, "p", false, opts);
        if opts.favor_precision {
            delete_by_link_density(tree, subtree, "head", false, opts);
        }
        if state.is_potential("table") || opts.favor_precision {
            for table in tree.iter_tags(subtree, &["table"]) {
                if link_density_test_tables(tree, table, opts) {
                    tree.remove(table);
                }
            }
        }

        if tree.child_count(subtree) == 0 {
            continue;
        }

        // widen the permitted tag set when paragraph text looks thin
        let paragraph_text: String = tree
            .iter_tags(subtree, &["p"])
            .into_iter()
            .map(|p| tree.text_content(p))
            .collect();
        if !text_chars_test(&paragraph_text)
            || paragraph_text.chars().count() < opts.min_extracted_size * 2
        {
            state.add_potential("div");
        }

        if !state.is_potential("ref") {
            tree.strip_tags(subtree, &["ref"]);
        }
        if !state.is_potential("span") {
            tree.strip_tags(subtree, &["span"]);
        }

        // rewrite each child of the winning subtree
        let mut last_element = tree.last_child(result_body);
        for child in tree.children(subtree) {
            let res = handle_paragraphs_child(tree, child, state, opts, &RewriteContext::root());
            last_element = append_child(tree, result_body, res, last_element, state);
        }

        // articles don't end on a header
        while let Some(last) = tree.last_child(result_body) {
            if HEADINGS.contains(&tree.tag(last)) {
                tree.remove(last);
            } else {
                break;
            }
        }

        if tree.child_count(result_body) > 1 {
            debug!("body rule {rule_index} wins");
            break;
        }
    }

    let temp_text = trim(&tree.text_content(result_body));
    if tree.child_count(result_body) == 0
        || temp_text.chars().count() < opts.min_extracted_size
    {
        if opts.favor_recall {
            state.add_potential("div");
        }
        recover_wild_text(tree, root, result_body, state, opts);
    } else {
        sure_thing = true;
    }

    tree.strip_elements(result_body, &["done"]);
    tree.strip_tags(result_body, &["div"]);
    let temp_text = trim(&tree.text_content(result_body));

    (result_body, temp_text, sure_thing)
}

/// Look for previously unconsidered wild elements throughout the
/// cleaned document to recover missing text parts.
pub fn recover_wild_text(
    tree: &mut Tree,
    root: NodeId,
    result_body: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) {
    debug!("recovering wild text elements");

    prune_unwanted_nodes(tree, root, DISCARD_RULES);
    if !state.is_potential("graphic") {
        prune_unwanted_nodes(tree, root, DISCARD_IMAGE_RULES);
    }
    if state.is_potential("ref") {
        tree.strip_tags(root, &["span"]);
    } else {
        tree.strip_tags(root, &["a", "ref", "span"]);
    }
    state.add_potential("div");

    let mut last_element = tree.last_child(result_body);
    let wild = tree.iter_tags(
        root,
        &["blockquote", "code", "div", "p", "pre", "q", "quote", "table", "lb"],
    );
    for element in wild {
        let res = handle_text_elem(tree, element, state, opts);
        last_element = append_child(tree, result_body, res, last_element, state);
    }
}
