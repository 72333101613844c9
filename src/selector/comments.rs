//! Ranked comment-locating rules and comment-specific discards.

use crate::etree::{NodeId, Tree};
use crate::patterns::{COMMENT_CLASS, COMMENT_DISCARD_CLASS, COMMENT_ID};
use crate::selector::{class, id_attr, Rule};

/// Comment rules in priority order. First match with content wins.
pub static COMMENT_RULES: &[Rule] = &[
    comment_rule_exact_id,
    comment_rule_class_marker,
    comment_rule_discussion,
];

/// Pruned out of the matched comment region before rewriting.
pub static COMMENT_DISCARD_RULES: &[Rule] = &[comment_discard_widgets];

fn is_comment_container(tree: &Tree, id: NodeId) -> bool {
    matches!(tree.tag(id), "div" | "section" | "ol" | "ul" | "list" | "aside")
}

/// Exact comment-section ids (`comments`, `disqus_thread`, `respond`).
fn comment_rule_exact_id(tree: &Tree, id: NodeId) -> bool {
    is_comment_container(tree, id) && COMMENT_ID.is_match(id_attr(tree, id))
}

/// Comment class markers on container elements.
fn comment_rule_class_marker(tree: &Tree, id: NodeId) -> bool {
    is_comment_container(tree, id) && COMMENT_CLASS.is_match(class(tree, id))
}

/// Discussion/reply areas referenced by id.
fn comment_rule_discussion(tree: &Tree, id: NodeId) -> bool {
    is_comment_container(tree, id) && COMMENT_CLASS.is_match(id_attr(tree, id))
}

/// Comment forms, reply widgets and metadata rows.
fn comment_discard_widgets(tree: &Tree, id: NodeId) -> bool {
    let class = class(tree, id);
    let id_val = id_attr(tree, id);
    COMMENT_DISCARD_CLASS.is_match(class) || COMMENT_DISCARD_CLASS.is_match(id_val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::load_html;
    use crate::selector::query;

    #[test]
    fn test_exact_id_rule() {
        let (tree, body) =
            load_html(r#"<body><div id="comments"><p>c</p></div></body>"#).unwrap();
        assert!(query(&tree, body, comment_rule_exact_id).is_some());
    }

    #[test]
    fn test_class_marker_rule() {
        let (tree, body) =
            load_html(r#"<body><section class="comments"><p>c</p></section></body>"#).unwrap();
        assert!(query(&tree, body, comment_rule_class_marker).is_some());
    }

    #[test]
    fn test_comment_form_discarded() {
        let (tree, body) = load_html(
            r#"<body><div class="comments"><div class="comment-form">form</div><p>keep</p></div></body>"#,
        )
        .unwrap();
        let found = query(&tree, body, comment_discard_widgets).unwrap();
        assert_eq!(tree.attr(found, "class"), Some("comment-form"));
    }

    #[test]
    fn test_non_container_not_matched() {
        let (tree, body) =
            load_html(r#"<body><a class="comments-link">c</a></body>"#).unwrap();
        assert!(query(&tree, body, comment_rule_class_marker).is_none());
    }
}
