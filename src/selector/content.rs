//! Ranked body-locating rules.
//!
//! Ordered by specificity: explicit article-body markers first, bare
//! `<article>` containers next, then progressively weaker content
//! markers. The candidate selector walks this list and stops at the
//! first rule that yields a non-trivial rewrite.

use crate::etree::{NodeId, Tree};
use crate::selector::{class, contains_ci, id_attr, Rule};

/// Body rules in priority order. First non-trivial match wins.
pub static BODY_RULES: &[Rule] = &[
    body_rule_article_body,
    body_rule_article_tag,
    body_rule_story_content,
    body_rule_generic_content,
    body_rule_main,
    body_rule_content_fallback,
];

fn is_container_tag(tree: &Tree, id: NodeId) -> bool {
    matches!(tree.tag(id), "article" | "div" | "main" | "section")
}

/// Explicit article-body markers: `itemprop="articleBody"`,
/// `post-content`, `entry-content`, `article-body` and relatives.
fn body_rule_article_body(tree: &Tree, id: NodeId) -> bool {
    let tag = tree.tag(id);
    let class = class(tree, id);
    let id_val = id_attr(tree, id);
    let item_prop = tree.attr(id, "itemprop").unwrap_or("");

    if tag == "td" {
        return contains_ci(class, "storybody") || contains_ci(id_val, "storybody");
    }
    if !is_container_tag(tree, id) {
        return false;
    }

    item_prop == "articleBody"
        || class == "post"
        || class == "entry"
        || contains_ci(class, "post-text")
        || contains_ci(class, "post_text")
        || contains_ci(class, "post-body")
        || contains_ci(class, "post-entry")
        || contains_ci(class, "postentry")
        || contains_ci(class, "post-content")
        || contains_ci(class, "post_content")
        || contains_ci(class, "postcontent")
        || contains_ci(class, "article-text")
        || contains_ci(class, "articletext")
        || contains_ci(class, "entry-content")
        || contains_ci(id_val, "entry-content")
        || contains_ci(class, "article-content")
        || contains_ci(id_val, "article-content")
        || contains_ci(class, "article__content")
        || contains_ci(id_val, "article__content")
        || contains_ci(class, "article-body")
        || contains_ci(id_val, "article-body")
        || contains_ci(class, "article__body")
        || contains_ci(id_val, "article__body")
        || contains_ci(class, "articlebody")
        || contains_ci(id_val, "articlebody")
        || contains_ci(class, "storybody")
        || contains_ci(id_val, "storybody")
        || contains_ci(class, "article_body")
        || contains_ci(id_val, "article_body")
        || contains_ci(class, "contentbody")
        || contains_ci(id_val, "contentbody")
        || contains_ci(class, "blog-content")
        || contains_ci(class, "blog_content")
        || contains_ci(class, "blogcontent")
        || contains_ci(class, "page-content")
        || contains_ci(class, "text-content")
        || contains_ci(class, "body-text")
        || contains_ci(id_val, "body-text")
}

/// Bare semantic article containers.
fn body_rule_article_tag(tree: &Tree, id: NodeId) -> bool {
    matches!(tree.tag(id), "article" | "story")
}

/// Story and section content markers.
fn body_rule_story_content(tree: &Tree, id: NodeId) -> bool {
    if !is_container_tag(tree, id) {
        return false;
    }
    let class = class(tree, id);
    let id_val = id_attr(tree, id);
    let role = tree.attr(id, "role").unwrap_or("");

    contains_ci(class, "post-bodycopy")
        || contains_ci(class, "storycontent")
        || contains_ci(class, "story-content")
        || contains_ci(class, "story-body")
        || contains_ci(id_val, "story-body")
        || class == "postarea"
        || contains_ci(class, "theme-content")
        || contains_ci(class, "section-content")
        || contains_ci(class, "single-content")
        || contains_ci(class, "single-post")
        || contains_ci(class, "main-column")
        || id_val.starts_with("primary")
        || class.starts_with("article")
        || class == "text"
        || id_val == "article"
        || id_val == "story"
        || class == "story"
        || contains_ci(class, "field-body")
        || contains_ci(class, "fulltext")
        || role == "article"
}

/// Generic content markers.
fn body_rule_generic_content(tree: &Tree, id: NodeId) -> bool {
    if !is_container_tag(tree, id) {
        return false;
    }
    let class = class(tree, id);
    let id_val = id_attr(tree, id);

    contains_ci(class, "content-main")
        || contains_ci(id_val, "content-main")
        || contains_ci(class, "content_main")
        || contains_ci(class, "content-body")
        || contains_ci(id_val, "content-body")
        || contains_ci(id_val, "contentbody")
        || contains_ci(class, "content__body")
        || contains_ci(class, "main-content")
        || contains_ci(id_val, "main-content")
        || id_val.eq_ignore_ascii_case("content")
        || class.eq_ignore_ascii_case("content")
}

/// `<main>` and main-markers.
fn body_rule_main(tree: &Tree, id: NodeId) -> bool {
    let tag = tree.tag(id);
    if tag == "main" {
        return true;
    }
    if !matches!(tag, "article" | "div" | "section") {
        return false;
    }
    class(tree, id).starts_with("main")
        || id_attr(tree, id).starts_with("main")
        || tree.attr(id, "role").unwrap_or("").starts_with("main")
}

/// Low-priority fallback: anything with "content" in its name that is
/// not an obvious boilerplate container.
fn body_rule_content_fallback(tree: &Tree, id: NodeId) -> bool {
    if !matches!(tree.tag(id), "div" | "section" | "td") {
        return false;
    }
    let class_lower = class(tree, id).to_ascii_lowercase();
    let id_lower = id_attr(tree, id).to_ascii_lowercase();
    if !class_lower.contains("content") && !id_lower.contains("content") {
        return false;
    }

    const BOILERPLATE_NAMES: &[&str] = &[
        "footer", "header", "sidebar", "comment", "share", "social", "related", "nav",
        "menu", "ad", "promo", "widget", "meta", "dropdown", "popup", "modal", "banner",
        "cookie", "newsletter", "subscribe", "signup", "login", "signin",
    ];
    !BOILERPLATE_NAMES
        .iter()
        .any(|name| class_lower.contains(name) || id_lower.contains(name))
}
