//! Selector infrastructure.
//!
//! The ranked body/comments/discard path expressions are translated
//! into ordered lists of predicate rules evaluated over the element
//! tree in document order; the expressions only use child/descendant
//! axes and attribute tests, so plain predicates cover them.

pub mod comments;
pub mod content;
pub mod discard;

use crate::etree::{NodeId, Tree};

/// A selector rule testing whether an element matches.
pub type Rule = fn(&Tree, NodeId) -> bool;

/// First descendant of `root` matching the rule, in document order.
#[must_use]
pub fn query(tree: &Tree, root: NodeId, rule: Rule) -> Option<NodeId> {
    tree.descendants(root).into_iter().find(|&id| rule(tree, id))
}

/// All descendants of `root` matching the rule, in document order.
#[must_use]
pub fn query_all(tree: &Tree, root: NodeId, rule: Rule) -> Vec<NodeId> {
    tree.descendants(root)
        .into_iter()
        .filter(|&id| rule(tree, id))
        .collect()
}

// === Attribute helpers shared by the rule sets ===

/// `class` attribute or empty string.
#[must_use]
pub fn class(tree: &Tree, id: NodeId) -> &str {
    tree.attr(id, "class").unwrap_or("")
}

/// `id` attribute or empty string.
#[must_use]
pub fn id_attr(tree: &Tree, id: NodeId) -> &str {
    tree.attr(id, "id").unwrap_or("")
}

/// Case-insensitive containment test.
#[must_use]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(needle)
}
