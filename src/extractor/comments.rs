//! Comments extraction.
//!
//! Walks the ranked comment rules; the first rule whose region yields
//! content wins. The region is pruned of forms and reply widgets,
//! inline wrappers are stripped, every remaining descendant is cleaned
//! and collected into a `body`-rooted tree, and the region is removed
//! from the main document so content extraction never sees it.

use log::debug;

use crate::etree::{NodeId, Tree};
use crate::html_processing::{handle_textnode, prune_unwanted_nodes, trim, TextFlags};
use crate::options::ExtractionOptions;
use crate::selector::comments::{COMMENT_DISCARD_RULES, COMMENT_RULES};
use crate::selector::query;

use super::state::ExtractionState;
use super::TAG_CATALOG;

/// Clean one node of the comment region. Only tags from the default
/// catalog survive; their attributes are dropped.
fn process_comments_node(
    tree: &mut Tree,
    elem: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> Option<NodeId> {
    if !TAG_CATALOG.contains(&tree.tag(elem)) {
        return None;
    }
    let flags = TextFlags {
        comments_fix: true,
        deduplicate: state.deduplicate,
        preserve_spaces: false,
    };
    if handle_textnode(tree, elem, flags, state.cache.as_mut(), opts) {
        tree.clear_attrs(elem);
        Some(elem)
    } else {
        None
    }
}

/// Extract the comment region from the tree.
///
/// Returns the comments body (possibly empty) and its flattened text;
/// the matched region is removed from the main tree.
pub fn extract_comments(
    tree: &mut Tree,
    root: NodeId,
    state: &mut ExtractionState,
    opts: &ExtractionOptions,
) -> (NodeId, String) {
    let comments_body = tree.new_element("body");

    for (rule_index, rule) in COMMENT_RULES.iter().enumerate() {
        let Some(subtree) = query(tree, root, *rule) else {
            continue;
        };

        prune_unwanted_nodes(tree, subtree, COMMENT_DISCARD_RULES);
        tree.strip_tags(subtree, &["a", "ref", "span"]);

        for elem in tree.descendants(subtree) {
            if let Some(cleaned) = process_comments_node(tree, elem, state, opts) {
                tree.append(comments_body, cleaned);
            }
        }

        if tree.child_count(comments_body) > 0 {
            debug!("comment rule {rule_index} wins");
            tree.remove(subtree);
            break;
        }
    }

    let text = trim(&tree.text_content(comments_body));
    (comments_body, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert_tags;
    use crate::html::load_html;

    fn run(html: &str, opts: &ExtractionOptions) -> (Tree, NodeId, NodeId, String) {
        let (mut tree, root) = load_html(html).unwrap();
        convert_tags(&mut tree, root, opts);
        let mut state = ExtractionState::new(opts);
        let (comments, text) = extract_comments(&mut tree, root, &mut state, opts);
        (tree, root, comments, text)
    }

    #[test]
    fn test_comment_section_extracted_and_removed() {
        let html = r#"<html><body>
            <article><p>Story text.</p></article>
            <section class="comments"><div class="c"><p>Nice!</p></div></section>
        </body></html>"#;
        let opts = ExtractionOptions {
            include_comments: true,
            ..ExtractionOptions::default()
        };
        let (tree, root, comments, text) = run(html, &opts);

        let paragraphs = tree.iter_tags(comments, &["p"]);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(tree.text(paragraphs[0]), Some("Nice!"));
        assert_eq!(text, "Nice!");

        // region is gone from the main tree
        assert!(tree
            .descendants(root)
            .into_iter()
            .all(|id| tree.attr(id, "class") != Some("comments")));
        assert!(!tree.text_content(root).contains("Nice!"));
    }

    #[test]
    fn test_comment_forms_pruned() {
        let html = r#"<html><body>
            <div id="comments">
                <p>Great article, thanks for writing it up.</p>
                <div class="comment-form"><p>Leave a reply here please</p></div>
            </div>
        </body></html>"#;
        let opts = ExtractionOptions::default();
        let (_tree, _root, _comments, text) = run(html, &opts);
        assert!(text.contains("Great article"));
        assert!(!text.contains("Leave a reply"));
    }

    #[test]
    fn test_inline_wrappers_stripped() {
        let html = r#"<html><body>
            <div class="comment-list">
                <p>Posted by <a href="/u/jo">jo</a>: solid write-up.</p>
            </div>
        </body></html>"#;
        let (tree, _root, comments, text) = run(html, &ExtractionOptions::default());
        assert!(tree.iter_tags(comments, &["ref"]).is_empty());
        assert!(text.contains("jo"));
        assert!(text.contains("solid write-up"));
    }

    #[test]
    fn test_no_comment_region_yields_empty_body() {
        let html = "<html><body><article><p>Just a story.</p></article></body></html>";
        let (tree, _root, comments, text) = run(html, &ExtractionOptions::default());
        assert_eq!(tree.child_count(comments), 0);
        assert!(text.is_empty());
    }

    #[test]
    fn test_line_breaks_become_paragraphs() {
        let html = r#"<html><body>
            <div id="comments"><p>First comment line.</p><br>Second line after break.</div>
        </body></html>"#;
        let (tree, _root, comments, text) = run(html, &ExtractionOptions::default());
        assert!(text.contains("Second line after break"));
        assert!(tree.iter_tags(comments, &["lb"]).is_empty());
    }
}
