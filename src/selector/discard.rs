//! Discard rules: subtrees removed before or during extraction.

use crate::etree::{NodeId, Tree};
use crate::patterns::{
    BOILERPLATE_CLASS, COMMENT_CLASS, COMMENT_ID, IMAGE_CARRIER_CLASS, NAVIGATION_CLASS,
};
use crate::selector::{class, id_attr, Rule};

/// Rules for page chrome that never belongs to the editorial content.
pub static DISCARD_RULES: &[Rule] = &[discard_navigation, discard_boilerplate];

/// Rules for image carriers, applied when images are disabled.
pub static DISCARD_IMAGE_RULES: &[Rule] = &[discard_image_carrier];

/// Rules removing comment sections up front (used without comment
/// extraction under `favor_precision`).
pub static REMOVE_COMMENTS_RULES: &[Rule] = &[discard_comment_section];

fn discard_navigation(tree: &Tree, id: NodeId) -> bool {
    let class = class(tree, id);
    let id_val = id_attr(tree, id);
    NAVIGATION_CLASS.is_match(class) || NAVIGATION_CLASS.is_match(id_val)
}

fn discard_boilerplate(tree: &Tree, id: NodeId) -> bool {
    let class = class(tree, id);
    let id_val = id_attr(tree, id);
    BOILERPLATE_CLASS.is_match(class) || BOILERPLATE_CLASS.is_match(id_val)
}

fn discard_image_carrier(tree: &Tree, id: NodeId) -> bool {
    if matches!(tree.tag(id), "figure" | "picture" | "source") {
        return true;
    }
    let class = class(tree, id);
    let id_val = id_attr(tree, id);
    IMAGE_CARRIER_CLASS.is_match(class) || IMAGE_CARRIER_CLASS.is_match(id_val)
}

/// Comment sections, by the same markers the comment selector uses.
pub fn discard_comment_section(tree: &Tree, id: NodeId) -> bool {
    let class = class(tree, id);
    let id_val = id_attr(tree, id);
    COMMENT_ID.is_match(id_val) || COMMENT_CLASS.is_match(class) || COMMENT_CLASS.is_match(id_val)
}
