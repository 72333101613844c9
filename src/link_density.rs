//! Link density testing.
//!
//! Checks whether a subtree should be removed because it is rich in
//! links relative to its text, which is typical of navigation menus,
//! tag clouds and related-post strips.

use crate::etree::{NodeId, Tree};
use crate::html_processing::trim;
use crate::options::ExtractionOptions;

/// Total length, short-link count, non-empty count and the trimmed
/// texts of short links.
fn collect_link_info(tree: &Tree, links: &[NodeId]) -> (usize, usize, usize, Vec<String>) {
    let mut link_length = 0;
    let mut n_short_links = 0;
    let mut n_non_empty_links = 0;
    let mut short_texts = Vec::new();

    for &link in links {
        let text = trim(&tree.text_content(link));
        let text_length = text.chars().count();
        if text_length == 0 {
            continue;
        }
        link_length += text_length;
        if text_length < 10 {
            n_short_links += 1;
            short_texts.push(text);
        }
        n_non_empty_links += 1;
    }

    (link_length, n_short_links, n_non_empty_links, short_texts)
}

/// Check whether a section should be removed because it is rich in
/// links.
///
/// Returns the boilerplate flag together with the trimmed texts of the
/// short links found, which the pruner's backtracking mode uses to
/// spot repeated navigation items.
#[must_use]
pub fn link_density_test(
    tree: &Tree,
    element: NodeId,
    opts: &ExtractionOptions,
) -> (bool, Vec<String>) {
    let links = tree.iter_tags(element, &["ref"]);
    if links.is_empty() {
        return (false, Vec::new());
    }

    let text = trim(&tree.text_content(element));
    let text_length = text.chars().count();

    // shortcut for a single dominating link
    if links.len() == 1 {
        let threshold: usize = if opts.favor_precision { 10 } else { 100 };
        let link_text = trim(&tree.text_content(links[0]));
        let link_text_length = link_text.chars().count();
        if link_text_length > threshold
            && (link_text_length as f64) > (text_length as f64) * 0.9
        {
            return (true, Vec::new());
        }
    }

    let has_next_sibling = tree.next_sibling(element).is_some();
    let limit_length: usize = if tree.tag(element) == "p" {
        if has_next_sibling {
            30
        } else {
            60
        }
    } else if has_next_sibling {
        100
    } else {
        300
    };

    if text_length < limit_length {
        let (link_length, n_short_links, n_non_empty_links, short_texts) =
            collect_link_info(tree, &links);

        if n_non_empty_links == 0 {
            return (true, Vec::new());
        }
        // link text dominates the element
        if (link_length as f64) > (text_length as f64) * 0.8 {
            return (true, short_texts);
        }
        // mostly short links, typical of nav menus
        if n_non_empty_links > 1
            && (n_short_links as f64) / (n_non_empty_links as f64) > 0.8
        {
            return (true, short_texts);
        }
        return (false, short_texts);
    }

    (false, Vec::new())
}

/// Check whether a table is link-heavy boilerplate.
#[must_use]
pub fn link_density_test_tables(tree: &Tree, table: NodeId, _opts: &ExtractionOptions) -> bool {
    let links = tree.iter_tags(table, &["ref"]);
    if links.is_empty() {
        return false;
    }

    let text = trim(&tree.text_content(table));
    let text_length = text.chars().count();
    if text_length < 200 {
        return false;
    }

    let (link_length, _, n_non_empty_links, _) = collect_link_info(tree, &links);
    if n_non_empty_links == 0 {
        return true;
    }

    if text_length < 1000 {
        (link_length as f64) > (text_length as f64) * 0.8
    } else {
        (link_length as f64) > (text_length as f64) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert_tags;
    use crate::html::load_html;

    fn prepared(html: &str) -> (Tree, NodeId) {
        let (mut tree, body) = load_html(html).unwrap();
        convert_tags(&mut tree, body, &ExtractionOptions::default());
        (tree, body)
    }

    #[test]
    fn test_nav_menu_is_flagged() {
        let (tree, body) = prepared(
            r#"<body><div>
                <a href="/home">Home</a>
                <a href="/about">About</a>
                <a href="/contact">Contact</a>
                <a href="/blog">Blog</a>
            </div></body>"#,
        );
        let div = tree.first_child(body).unwrap();
        let (flagged, short_texts) = link_density_test(&tree, div, &ExtractionOptions::default());
        assert!(flagged);
        assert!(!short_texts.is_empty() || flagged);
    }

    #[test]
    fn test_article_paragraph_not_flagged() {
        let (tree, body) = prepared(
            r#"<body><p>This is a long paragraph with substantial text content that
            discusses various topics. It contains a <a href="/link">single link</a> but
            the majority of the content is regular text, not links, so it should stay.
            </p></body>"#,
        );
        let p = tree.first_child(body).unwrap();
        let (flagged, _) = link_density_test(&tree, p, &ExtractionOptions::default());
        assert!(!flagged);
    }

    #[test]
    fn test_no_links_not_flagged() {
        let (tree, body) = prepared("<body><p>No links at all here.</p></body>");
        let p = tree.first_child(body).unwrap();
        let (flagged, texts) = link_density_test(&tree, p, &ExtractionOptions::default());
        assert!(!flagged);
        assert!(texts.is_empty());
    }

    #[test]
    fn test_single_dominating_link_flagged() {
        let (tree, body) = prepared(
            r#"<body><div><a href="/x">A single but very long navigation caption that
            dominates the whole container text completely and then some more words
            to cross the length threshold for the dominating link check</a></div></body>"#,
        );
        let div = tree.first_child(body).unwrap();
        let (flagged, _) = link_density_test(&tree, div, &ExtractionOptions::default());
        assert!(flagged);
    }

    #[test]
    fn test_table_nav_flagged() {
        let mut cells = String::new();
        for i in 0..12 {
            cells.push_str(&format!(
                r#"<tr><td><a href="/{i}">Navigation Link Category Number {i} Section</a></td></tr>"#
            ));
        }
        let (tree, body) = prepared(&format!("<body><table>{cells}</table></body>"));
        let table = tree.first_child(body).unwrap();
        assert!(link_density_test_tables(&tree, table, &ExtractionOptions::default()));
    }

    #[test]
    fn test_data_table_not_flagged() {
        let (tree, body) = prepared(
            r#"<body><table>
                <tr><th>Name</th><th>Score</th><th>Date</th></tr>
                <tr><td>John Smith</td><td>95</td><td>2024-01-15</td></tr>
                <tr><td>Jane Doe</td><td>87</td><td>2024-01-16</td></tr>
                <tr><td>Bob Wilson</td><td>92</td><td>2024-01-17</td></tr>
            </table></body>"#,
        );
        let table = tree.first_child(body).unwrap();
        assert!(!link_density_test_tables(&tree, table, &ExtractionOptions::default()));
    }
}
