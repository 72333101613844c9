//! Tag Converter: rewrites the ingested HTML vocabulary into the
//! internal one.
//!
//! Presentational tags collapse to semantic equivalents (`b`/`strong`
//! to `hi rend=bold`, `h1`..`h6` to `head rend=hN`, `a` to
//! `ref target=…`, and so on). Tables keep their HTML names here; the
//! table policy of the element rewriter mints `table`/`row`/`cell`
//! later. Formatting always converts to `hi` and anchors always
//! convert to `ref`; the corresponding feature toggles act at the
//! stripping and serialization points so the toggled-off vocabulary
//! never reaches the output.

use crate::etree::{NodeId, Tree};
use crate::options::ExtractionOptions;

/// Style hint carried on `hi` elements, keyed by source tag.
fn hi_rend(tag: &str) -> Option<&'static str> {
    match tag {
        "b" | "strong" => Some("bold"),
        "i" | "em" => Some("italic"),
        "u" => Some("underline"),
        "kbd" | "samp" | "tt" | "var" => Some("tt"),
        "sub" => Some("sub"),
        "sup" => Some("sup"),
        "mark" => Some("mark"),
        _ => None,
    }
}

/// Rewrite the subtree below `root` (and `root` itself) in place.
pub fn convert_tags(tree: &mut Tree, root: NodeId, _opts: &ExtractionOptions) {
    for id in tree.iter(root) {
        let tag = tree.tag(id).to_string();
        match tag.as_str() {
            "a" => {
                let target = tree
                    .attr(id, "href")
                    .map(|href| href.trim().to_string())
                    .filter(|href| !href.is_empty());
                tree.set_tag(id, "ref");
                tree.clear_attrs(id);
                if let Some(target) = target {
                    tree.set_attr(id, "target", &target);
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                tree.set_tag(id, "head");
                tree.clear_attrs(id);
                tree.set_attr(id, "rend", &tag);
            }
            "ul" | "ol" | "dl" => {
                tree.set_tag(id, "list");
                tree.clear_attrs(id);
            }
            "li" | "dd" | "dt" => {
                tree.set_tag(id, "item");
                tree.clear_attrs(id);
            }
            "blockquote" | "q" => {
                tree.set_tag(id, "quote");
                tree.clear_attrs(id);
            }
            "pre" => {
                if looks_like_code(tree, id) {
                    tree.set_tag(id, "code");
                } else {
                    tree.set_tag(id, "quote");
                }
                tree.clear_attrs(id);
            }
            "code" => {
                tree.set_tag(id, "code");
                tree.clear_attrs(id);
            }
            "br" | "hr" => {
                tree.set_tag(id, "lb");
                tree.clear_attrs(id);
            }
            "del" | "s" | "strike" => {
                tree.set_tag(id, "del");
                tree.clear_attrs(id);
            }
            "img" => {
                // attributes stay: the image policy picks its source
                // from src/data-src variants later
                tree.set_tag(id, "graphic");
            }
            other => {
                if let Some(rend) = hi_rend(other) {
                    tree.set_tag(id, "hi");
                    tree.clear_attrs(id);
                    tree.set_attr(id, "rend", rend);
                }
            }
        }
    }
}

/// Code blocks announce themselves through a `lang` attribute, a
/// single nested `code` element or a highlighter class on the parent.
fn looks_like_code(tree: &Tree, id: NodeId) -> bool {
    if tree.attr(id, "lang").is_some() {
        return true;
    }
    if let Some(class) = tree.attr(id, "class") {
        if class.contains("highlight") || class.contains("language-") {
            return true;
        }
    }
    if let Some(parent) = tree.parent(id) {
        if let Some(class) = tree.attr(parent, "class") {
            if class.contains("highlight") {
                return true;
            }
        }
    }
    let children = tree.children(id);
    children.len() == 1 && tree.tag(children[0]) == "code"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::load_html;

    fn converted(html: &str) -> (Tree, NodeId) {
        let (mut tree, body) = load_html(html).unwrap();
        convert_tags(&mut tree, body, &ExtractionOptions::default());
        (tree, body)
    }

    #[test]
    fn test_convert_bold_and_italic() {
        let (tree, body) = converted("<body><p><b>x</b><em>y</em></p></body>");
        let p = tree.first_child(body).unwrap();
        let children = tree.children(p);
        assert_eq!(tree.tag(children[0]), "hi");
        assert_eq!(tree.attr(children[0], "rend"), Some("bold"));
        assert_eq!(tree.tag(children[1]), "hi");
        assert_eq!(tree.attr(children[1], "rend"), Some("italic"));
    }

    #[test]
    fn test_convert_headings_carry_level() {
        let (tree, body) = converted("<body><h2>t</h2></body>");
        let head = tree.first_child(body).unwrap();
        assert_eq!(tree.tag(head), "head");
        assert_eq!(tree.attr(head, "rend"), Some("h2"));
    }

    #[test]
    fn test_convert_anchor_keeps_target_only() {
        let (tree, body) =
            converted(r#"<body><a href=" http://x.example " class="c">x</a></body>"#);
        let a = tree.first_child(body).unwrap();
        assert_eq!(tree.tag(a), "ref");
        assert_eq!(tree.attr(a, "target"), Some("http://x.example"));
        assert!(tree.attr(a, "class").is_none());
    }

    #[test]
    fn test_convert_lists() {
        let (tree, body) = converted("<body><ul><li>one</li></ul></body>");
        let list = tree.first_child(body).unwrap();
        assert_eq!(tree.tag(list), "list");
        assert_eq!(tree.tag(tree.first_child(list).unwrap()), "item");
    }

    #[test]
    fn test_convert_pre_with_code_child_becomes_code() {
        let (tree, body) = converted("<body><pre><code>x = 1</code></pre></body>");
        let block = tree.first_child(body).unwrap();
        assert_eq!(tree.tag(block), "code");
    }

    #[test]
    fn test_convert_plain_pre_becomes_quote() {
        let (tree, body) = converted("<body><pre>plain text</pre></body>");
        let block = tree.first_child(body).unwrap();
        assert_eq!(tree.tag(block), "quote");
    }

    #[test]
    fn test_convert_tables_untouched() {
        let (tree, body) = converted("<body><table><tr><td>c</td></tr></table></body>");
        let table = tree.first_child(body).unwrap();
        assert_eq!(tree.tag(table), "table");
        assert!(!tree.iter_tags(table, &["tr", "td"]).is_empty());
    }

    #[test]
    fn test_convert_img_keeps_attributes() {
        let (tree, body) = converted(r#"<body><img data-src="x.jpg" alt="pic"></body>"#);
        let graphic = tree.first_child(body).unwrap();
        assert_eq!(tree.tag(graphic), "graphic");
        assert_eq!(tree.attr(graphic, "data-src"), Some("x.jpg"));
        assert_eq!(tree.attr(graphic, "alt"), Some("pic"));
    }

    #[test]
    fn test_convert_br_and_del() {
        let (tree, body) = converted("<body><p>a<br>b<s>c</s></p></body>");
        let p = tree.first_child(body).unwrap();
        let children = tree.children(p);
        assert_eq!(tree.tag(children[0]), "lb");
        assert_eq!(tree.tag(children[1]), "del");
    }

    #[test]
    fn test_convert_is_idempotent_on_internal_vocabulary() {
        let (mut tree, body) = converted("<body><p><b>x</b></p></body>");
        convert_tags(&mut tree, body, &ExtractionOptions::default());
        let p = tree.first_child(body).unwrap();
        let hi = tree.first_child(p).unwrap();
        assert_eq!(tree.tag(hi), "hi");
        assert_eq!(tree.attr(hi, "rend"), Some("bold"));
    }
}
