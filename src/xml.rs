//! Output serialization: text projection, XML, TEI-XML, JSON and CSV.

use log::warn;
use serde_json::Value;

use crate::etree::{NodeId, Tree};
use crate::extractor::OUTPUT_VOCABULARY;
use crate::options::OutputFormat;
use crate::result::ExtractedDocument;

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

/// Remove empty placeholder elements before serialization. Graphics
/// carry their information in attributes and are kept.
pub fn prune_empty_output(tree: &mut Tree, body: NodeId) {
    for id in tree.descendants(body).into_iter().rev() {
        if tree.tag(id) != "graphic"
            && tree.child_count(id) == 0
            && tree.text(id).is_none()
            && tree.tail(id).is_none()
        {
            tree.remove(id);
        }
    }
}

// === Text projection ===

fn heading_marker(rend: Option<&str>) -> &'static str {
    match rend {
        Some("h1") => "#",
        Some("h2") => "##",
        Some("h3") => "###",
        Some("h4") => "####",
        Some("h5") => "#####",
        _ => "######",
    }
}

fn inline_text(tree: &Tree, id: NodeId, formatting: bool, links: bool, out: &mut String) {
    if let Some(text) = tree.text(id) {
        out.push_str(text);
    }
    for child in tree.children(id) {
        match tree.tag(child) {
            "hi" if formatting => {
                let marker = match tree.attr(child, "rend") {
                    Some("bold") => "**",
                    Some("italic") => "*",
                    _ => "",
                };
                out.push_str(marker);
                inline_text(tree, child, formatting, links, out);
                out.push_str(marker);
            }
            "del" if formatting => {
                out.push_str("~~");
                inline_text(tree, child, formatting, links, out);
                out.push_str("~~");
            }
            "ref" => {
                let mut label = String::new();
                inline_text(tree, child, formatting, links, &mut label);
                match tree.attr(child, "target") {
                    Some(target) if links => {
                        out.push('[');
                        out.push_str(&label);
                        out.push_str("](");
                        out.push_str(target);
                        out.push(')');
                    }
                    _ => out.push_str(&label),
                }
            }
            "lb" => out.push('\n'),
            _ => inline_text(tree, child, formatting, links, out),
        }
        if let Some(tail) = tree.tail(child) {
            out.push_str(tail);
        }
    }
}

fn render_block(tree: &Tree, id: NodeId, formatting: bool, links: bool, blocks: &mut Vec<String>) {
    let mut text = String::new();
    match tree.tag(id) {
        "head" => {
            inline_text(tree, id, formatting, links, &mut text);
            if formatting {
                text = format!("{} {}", heading_marker(tree.attr(id, "rend")), text.trim());
            }
        }
        "list" => {
            for item in tree.children(id) {
                let mut item_text = String::new();
                inline_text(tree, item, formatting, links, &mut item_text);
                let item_text = item_text.trim().to_string();
                if item_text.is_empty() {
                    continue;
                }
                if !text.is_empty() {
                    text.push('\n');
                }
                if formatting {
                    text.push_str("- ");
                }
                text.push_str(&item_text);
            }
        }
        "table" => {
            for row in tree.children(id) {
                let cells: Vec<String> = tree
                    .children(row)
                    .into_iter()
                    .map(|cell| {
                        let mut cell_text = String::new();
                        inline_text(tree, cell, formatting, links, &mut cell_text);
                        cell_text.trim().to_string()
                    })
                    .collect();
                if cells.iter().all(String::is_empty) {
                    continue;
                }
                if !text.is_empty() {
                    text.push('\n');
                }
                if formatting {
                    text.push_str(&format!("| {} |", cells.join(" | ")));
                } else {
                    text.push_str(&cells.join(" "));
                }
            }
        }
        "code" => {
            inline_text(tree, id, formatting, links, &mut text);
            if formatting {
                text = format!("```\n{}\n```", text.trim_end());
            }
        }
        "quote" => {
            inline_text(tree, id, formatting, links, &mut text);
            if formatting {
                text = text
                    .lines()
                    .map(|line| format!("> {line}"))
                    .collect::<Vec<_>>()
                    .join("\n");
            }
        }
        "graphic" => {
            if formatting {
                let alt = tree.attr(id, "alt").unwrap_or("");
                let src = tree.attr(id, "src").unwrap_or("");
                text = format!("![{alt}]({src})");
            } else if let Some(alt) = tree.attr(id, "alt") {
                text = alt.to_string();
            }
        }
        "lb" => {
            if let Some(tail) = tree.tail(id) {
                text = tail.to_string();
            }
        }
        _ => {
            inline_text(tree, id, formatting, links, &mut text);
        }
    }
    blocks.push(text);
}

/// Project the body tree to plain text, one block per line.
#[must_use]
pub fn xmltotxt(tree: &Tree, body: NodeId, formatting: bool, links: bool) -> String {
    let mut blocks: Vec<String> = Vec::new();
    for child in tree.children(body) {
        render_block(tree, child, formatting, links, &mut blocks);
    }
    blocks.retain(|block| !block.trim().is_empty());
    let mut out = blocks.join("\n");
    out = out.trim().to_string();
    out
}

// === XML serialization ===

fn serialize_element(tree: &Tree, id: NodeId, out: &mut String) {
    let tag = tree.tag(id);
    out.push('<');
    out.push_str(tag);
    for (name, value) in tree.attrs(id) {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    if tree.text(id).is_none() && tree.child_count(id) == 0 {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if let Some(text) = tree.text(id) {
        out.push_str(&escape_text(text));
    }
    for child in tree.children(id) {
        serialize_element(tree, child, out);
        if let Some(tail) = tree.tail(child) {
            out.push_str(&escape_text(tail));
        }
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn serialize_children(tree: &Tree, root: NodeId, wrapper: &str, out: &mut String) {
    out.push('<');
    out.push_str(wrapper);
    out.push('>');
    if let Some(text) = tree.text(root) {
        out.push_str(&escape_text(text));
    }
    for child in tree.children(root) {
        serialize_element(tree, child, out);
        if let Some(tail) = tree.tail(child) {
            out.push_str(&escape_text(tail));
        }
    }
    out.push_str("</");
    out.push_str(wrapper);
    out.push('>');
}

fn push_doc_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }
}

/// Serialize the internal vocabulary as a `<doc>` document with
/// metadata attributes.
#[must_use]
pub fn build_xml_output(document: &ExtractedDocument) -> String {
    let meta = &document.metadata;
    let mut out = String::from("<doc");
    push_doc_attr(&mut out, "sitename", meta.sitename.as_deref());
    push_doc_attr(&mut out, "title", meta.title.as_deref());
    push_doc_attr(&mut out, "author", meta.author.as_deref());
    push_doc_attr(&mut out, "date", meta.date.as_deref());
    push_doc_attr(&mut out, "url", meta.url.as_deref());
    push_doc_attr(&mut out, "hostname", meta.hostname.as_deref());
    push_doc_attr(&mut out, "description", meta.description.as_deref());
    let categories = meta.categories.join(",");
    let tags = meta.tags.join(",");
    push_doc_attr(&mut out, "categories", Some(categories.as_str()));
    push_doc_attr(&mut out, "tags", Some(tags.as_str()));
    push_doc_attr(&mut out, "license", meta.license.as_deref());
    push_doc_attr(&mut out, "id", meta.id.as_deref());
    push_doc_attr(&mut out, "fingerprint", meta.fingerprint.as_deref());
    out.push('>');

    let (tree, body) = document.body();
    serialize_children(tree, body, "main", &mut out);
    if let Some((tree, comments)) = document.comments_body() {
        serialize_children(tree, comments, "comments", &mut out);
    }
    out.push_str("</doc>");
    out
}

/// Structural TEI check: the body may only contain the element set the
/// TEI mapping covers.
#[must_use]
pub fn validate_tei(tree: &Tree, body: NodeId) -> bool {
    tree.descendants(body)
        .into_iter()
        .all(|id| OUTPUT_VOCABULARY.contains(&tree.tag(id)))
}

/// Serialize to TEI-flavored XML with a minimal header.
#[must_use]
pub fn build_tei_output(document: &ExtractedDocument, tei_validation: bool) -> String {
    let meta = &document.metadata;
    let (tree, body) = document.body();

    if tei_validation && !validate_tei(tree, body) {
        warn!("TEI validation failed: foreign elements in body");
    }

    let mut out = String::from(r#"<TEI xmlns="http://www.tei-c.org/ns/1.0">"#);
    out.push_str("<teiHeader><fileDesc><titleStmt><title>");
    out.push_str(&escape_text(meta.title.as_deref().unwrap_or("")));
    out.push_str("</title></titleStmt><publicationStmt><publisher>");
    out.push_str(&escape_text(meta.sitename.as_deref().unwrap_or("")));
    out.push_str("</publisher></publicationStmt><sourceDesc><p>");
    out.push_str(&escape_text(meta.url.as_deref().unwrap_or("")));
    out.push_str("</p></sourceDesc></fileDesc></teiHeader>");
    out.push_str("<text>");
    serialize_children(tree, body, "body", &mut out);
    out.push_str("</text></TEI>");
    out
}

/// JSON output: flat object with the metadata fields plus the text
/// payloads.
#[must_use]
pub fn build_json_output(document: &ExtractedDocument) -> String {
    let mut value = serde_json::to_value(&document.metadata).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.insert("text".to_string(), Value::String(document.text.clone()));
        map.insert(
            "comments".to_string(),
            Value::String(document.comments.clone()),
        );
        map.insert(
            "raw_text".to_string(),
            Value::String(document.raw_text.clone()),
        );
    }
    serde_json::to_string(&value).unwrap_or_default()
}

fn csv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// Tab-separated line: url, id, fingerprint, hostname, title, date,
/// text, comments.
#[must_use]
pub fn txttocsv(document: &ExtractedDocument) -> String {
    let meta = &document.metadata;
    let fields = [
        meta.url.clone().unwrap_or_default(),
        meta.id.clone().unwrap_or_default(),
        meta.fingerprint.clone().unwrap_or_default(),
        meta.hostname.clone().unwrap_or_default(),
        meta.title.clone().unwrap_or_default(),
        meta.date.clone().unwrap_or_default(),
        document.text.clone(),
        document.comments.clone(),
    ];
    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Convert the extraction result to the chosen output format.
#[must_use]
pub fn determine_returnstring(
    document: &ExtractedDocument,
    format: OutputFormat,
    tei_validation: bool,
) -> String {
    match format {
        OutputFormat::Txt => {
            let mut out = document.text.clone();
            if !document.comments.is_empty() {
                out.push('\n');
                out.push_str(&document.comments);
            }
            out.trim().to_string()
        }
        OutputFormat::Csv => txttocsv(document),
        OutputFormat::Json => build_json_output(document),
        OutputFormat::Xml => build_xml_output(document),
        OutputFormat::XmlTei => build_tei_output(document, tei_validation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etree::Tree;

    fn sample_tree() -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let body = tree.new_element("body");
        let head = tree.sub_element(body, "head");
        tree.set_attr(head, "rend", "h2");
        tree.set_text(head, Some("Title".into()));
        let p = tree.sub_element(body, "p");
        tree.set_text(p, Some("Hello ".into()));
        let hi = tree.sub_element(p, "hi");
        tree.set_attr(hi, "rend", "bold");
        tree.set_text(hi, Some("world".into()));
        tree.set_tail(hi, Some(".".into()));
        (tree, body)
    }

    #[test]
    fn test_xmltotxt_plain() {
        let (tree, body) = sample_tree();
        let text = xmltotxt(&tree, body, false, false);
        assert_eq!(text, "Title\nHello world.");
    }

    #[test]
    fn test_xmltotxt_formatting_markers() {
        let (tree, body) = sample_tree();
        let text = xmltotxt(&tree, body, true, false);
        assert_eq!(text, "## Title\nHello **world**.");
    }

    #[test]
    fn test_xmltotxt_link_markers() {
        let mut tree = Tree::new();
        let body = tree.new_element("body");
        let p = tree.sub_element(body, "p");
        tree.set_text(p, Some("See ".into()));
        let link = tree.sub_element(p, "ref");
        tree.set_attr(link, "target", "http://x.example");
        tree.set_text(link, Some("here".into()));
        assert_eq!(
            xmltotxt(&tree, body, false, true),
            "See [here](http://x.example)"
        );
        assert_eq!(xmltotxt(&tree, body, false, false), "See here");
    }

    #[test]
    fn test_xmltotxt_list_and_table() {
        let mut tree = Tree::new();
        let body = tree.new_element("body");
        let list = tree.sub_element(body, "list");
        for label in ["one", "two"] {
            let item = tree.sub_element(list, "item");
            tree.set_text(item, Some(label.into()));
        }
        let table = tree.sub_element(body, "table");
        let row = tree.sub_element(table, "row");
        for label in ["a", "b"] {
            let cell = tree.sub_element(row, "cell");
            tree.set_text(cell, Some(label.into()));
        }
        assert_eq!(xmltotxt(&tree, body, false, false), "one\ntwo\na b");
        assert_eq!(
            xmltotxt(&tree, body, true, false),
            "- one\n- two\n| a | b |"
        );
    }

    #[test]
    fn test_serialize_escapes_and_nests() {
        let mut tree = Tree::new();
        let body = tree.new_element("body");
        let p = tree.sub_element(body, "p");
        tree.set_text(p, Some("a < b & c".into()));
        let mut out = String::new();
        serialize_children(&tree, body, "main", &mut out);
        assert_eq!(out, "<main><p>a &lt; b &amp; c</p></main>");
    }

    #[test]
    fn test_serialize_self_closing_graphic() {
        let mut tree = Tree::new();
        let body = tree.new_element("body");
        let graphic = tree.sub_element(body, "graphic");
        tree.set_attr(graphic, "src", "http://cdn/i.jpg");
        let mut out = String::new();
        serialize_children(&tree, body, "main", &mut out);
        assert_eq!(out, r#"<main><graphic src="http://cdn/i.jpg"/></main>"#);
    }

    #[test]
    fn test_prune_empty_output_keeps_graphic() {
        let mut tree = Tree::new();
        let body = tree.new_element("body");
        let p = tree.sub_element(body, "p");
        tree.sub_element(p, "hi");
        let graphic = tree.sub_element(body, "graphic");
        tree.set_attr(graphic, "src", "x.jpg");
        prune_empty_output(&mut tree, body);
        // the empty hi and then the emptied p are gone, graphic stays
        assert_eq!(tree.children(body), vec![graphic]);
    }

    #[test]
    fn test_validate_tei_accepts_vocabulary() {
        let (tree, body) = sample_tree();
        assert!(validate_tei(&tree, body));
    }

    #[test]
    fn test_validate_tei_rejects_foreign() {
        let mut tree = Tree::new();
        let body = tree.new_element("body");
        tree.sub_element(body, "video");
        assert!(!validate_tei(&tree, body));
    }
}
