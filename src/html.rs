//! HTML ingestion.
//!
//! Parses HTML with `dom_query` and folds the `<body>` subtree into
//! the internal text/tail tree. Text nodes become the `text` of their
//! parent (when leading) or the `tail` of the preceding element, which
//! is the shape the whole pipeline operates on.

use dom_query::{Document, NodeRef};

use crate::etree::{NodeId, Tree};

/// Parse an HTML document into the internal tree.
///
/// Returns the tree together with its `body` root, or `None` for
/// blank input.
#[must_use]
pub fn load_html(html: &str) -> Option<(Tree, NodeId)> {
    if html.trim().is_empty() {
        return None;
    }
    let mut tree = Tree::new();
    let body = parse_fragment_into(&mut tree, html);
    Some((tree, body))
}

/// Fold an HTML fragment into an existing tree under a fresh `body`
/// element and return it.
pub fn parse_fragment_into(tree: &mut Tree, html: &str) -> NodeId {
    let doc = Document::from(html);
    let body = tree.new_element("body");
    if let Some(node) = doc.select("body").nodes().first() {
        fold_children(tree, body, node);
    }
    body
}

/// Convert the children of a parsed node, distributing text nodes
/// over text/tail fields.
fn fold_children(tree: &mut Tree, parent: NodeId, node: &NodeRef) {
    let mut last_child: Option<NodeId> = None;

    for child in node.children() {
        if child.is_element() {
            let Some(name) = child.node_name() else {
                continue;
            };
            let tag = name.to_lowercase();
            let element = tree.sub_element(parent, &tag);
            for attr in child.attrs() {
                tree.set_attr(element, &attr.name.local.to_lowercase(), &attr.value);
            }
            fold_children(tree, element, &child);
            last_child = Some(element);
        } else if child.is_text() {
            let fragment = child.text().to_string();
            if fragment.is_empty() {
                continue;
            }
            match last_child {
                Some(prev) => {
                    let merged = match tree.tail(prev) {
                        Some(existing) => format!("{existing}{fragment}"),
                        None => fragment,
                    };
                    tree.set_tail(prev, Some(merged));
                }
                None => {
                    let merged = match tree.text(parent) {
                        Some(existing) => format!("{existing}{fragment}"),
                        None => fragment,
                    };
                    tree.set_text(parent, Some(merged));
                }
            }
        }
        // comments and other node kinds are dropped
    }
}
