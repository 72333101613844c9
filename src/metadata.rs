//! Metadata extraction.
//!
//! Collects document metadata from meta tags, JSON-LD payloads and a
//! few obvious DOM fallbacks. Runs on the parsed document before any
//! cleaning, since most of the signal lives in `<head>`.

use dom_query::{Document, Selection};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::html_processing::trim;
use crate::options::ExtractionOptions;

/// Metadata of an extracted document.
///
/// All fields are optional; dates are normalized to `YYYY-MM-DD` when
/// they parse.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub hostname: Option<String>,
    pub description: Option<String>,
    pub sitename: Option<String>,
    pub date: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub license: Option<String>,
    pub language: Option<String>,
    /// Caller-provided record id.
    pub id: Option<String>,
    /// Content fingerprint, filled in after extraction.
    pub fingerprint: Option<String>,
}

fn attr_of(doc: &Document, selector: &str, attr: &str) -> Option<String> {
    let sel = doc.select(selector);
    let node = sel.nodes().first()?;
    let value = Selection::from(*node).attr(attr)?;
    let value = trim(&value);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn all_attrs(doc: &Document, selector: &str, attr: &str) -> Vec<String> {
    doc.select(selector)
        .nodes()
        .iter()
        .filter_map(|node| {
            let value = Selection::from(*node).attr(attr)?;
            let value = trim(&value);
            if value.is_empty() {
                None
            } else {
                Some(value)
            }
        })
        .collect()
}

fn text_of(doc: &Document, selector: &str) -> Option<String> {
    let sel = doc.select(selector);
    let node = sel.nodes().first()?;
    let text = trim(&node.text());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Normalize a date string to `YYYY-MM-DD` when it parses; otherwise
/// keep the trimmed original.
fn normalize_date(raw: &str) -> Option<String> {
    let raw = trim(raw);
    if raw.is_empty() {
        return None;
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(&raw) {
        return Some(datetime.format("%Y-%m-%d").to_string());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    Some(raw)
}

#[derive(Default)]
struct JsonLdFacts {
    title: Option<String>,
    author: Option<String>,
    date: Option<String>,
}

fn author_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => Some(name.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(author_from_value).collect();
            if names.is_empty() {
                None
            } else {
                Some(names.join("; "))
            }
        }
        _ => None,
    }
}

fn collect_json_ld(value: &Value, facts: &mut JsonLdFacts) {
    match value {
        Value::Object(map) => {
            if facts.title.is_none() {
                facts.title = map
                    .get("headline")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            if facts.author.is_none() {
                facts.author = map.get("author").and_then(author_from_value);
            }
            if facts.date.is_none() {
                facts.date = map
                    .get("datePublished")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            for entry in map.values() {
                collect_json_ld(entry, facts);
            }
        }
        Value::Array(items) => {
            for entry in items {
                collect_json_ld(entry, facts);
            }
        }
        _ => {}
    }
}

fn json_ld_facts(doc: &Document) -> JsonLdFacts {
    let mut facts = JsonLdFacts::default();
    for node in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
        let payload = Selection::from(*node).text().to_string();
        if payload.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&payload) {
            Ok(value) => collect_json_ld(&value, &mut facts),
            Err(err) => debug!("unparseable JSON-LD payload: {err}"),
        }
    }
    facts
}

/// Extract document metadata.
#[must_use]
pub fn extract_metadata(doc: &Document, opts: &ExtractionOptions) -> Metadata {
    let json_ld = json_ld_facts(doc);

    let title = attr_of(doc, r#"meta[property="og:title"]"#, "content")
        .or_else(|| text_of(doc, "title"))
        .or(json_ld.title)
        .or_else(|| text_of(doc, "h1"));

    let mut author = attr_of(doc, r#"meta[name="author"]"#, "content")
        .or_else(|| attr_of(doc, r#"meta[property="article:author"]"#, "content"))
        .or(json_ld.author);
    if let Some(name) = &author {
        let lowered = name.to_lowercase();
        if opts
            .author_blacklist
            .iter()
            .any(|entry| lowered.contains(&entry.to_lowercase()))
        {
            author = None;
        }
    }

    let url = attr_of(doc, r#"link[rel="canonical"]"#, "href")
        .or_else(|| attr_of(doc, r#"meta[property="og:url"]"#, "content"))
        .filter(|candidate| candidate.starts_with("http"))
        .or_else(|| opts.url.clone());
    let hostname = url
        .as_deref()
        .and_then(|candidate| Url::parse(candidate).ok())
        .and_then(|parsed| parsed.host_str().map(str::to_string));

    let date = attr_of(doc, r#"meta[property="article:published_time"]"#, "content")
        .or_else(|| attr_of(doc, "time[datetime]", "datetime"))
        .or(json_ld.date)
        .as_deref()
        .and_then(normalize_date);

    let language = attr_of(doc, "html", "lang")
        .or_else(|| {
            attr_of(doc, r#"meta[property="og:locale"]"#, "content")
        })
        .map(|lang| {
            let prefix = lang.split(['-', '_']).next().unwrap_or_default();
            prefix.to_lowercase()
        });

    Metadata {
        title,
        author,
        url,
        hostname,
        description: attr_of(doc, r#"meta[name="description"]"#, "content")
            .or_else(|| attr_of(doc, r#"meta[property="og:description"]"#, "content")),
        sitename: attr_of(doc, r#"meta[property="og:site_name"]"#, "content"),
        date,
        categories: all_attrs(doc, r#"meta[property="article:section"]"#, "content"),
        tags: all_attrs(doc, r#"meta[property="article:tag"]"#, "content"),
        license: attr_of(doc, r#"link[rel="license"]"#, "href"),
        language,
        id: None,
        fingerprint: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::from(html)
    }

    #[test]
    fn test_title_precedence() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <title>Tag Title</title>
        </head><body><h1>H1 Title</h1></body></html>"#;
        let meta = extract_metadata(&doc(html), &ExtractionOptions::default());
        assert_eq!(meta.title.as_deref(), Some("OG Title"));

        let html = "<html><head><title>Tag Title</title></head><body></body></html>";
        let meta = extract_metadata(&doc(html), &ExtractionOptions::default());
        assert_eq!(meta.title.as_deref(), Some("Tag Title"));
    }

    #[test]
    fn test_author_and_blacklist() {
        let html = r#"<html><head><meta name="author" content="Jo Writer"></head><body></body></html>"#;
        let meta = extract_metadata(&doc(html), &ExtractionOptions::default());
        assert_eq!(meta.author.as_deref(), Some("Jo Writer"));

        let opts = ExtractionOptions {
            author_blacklist: vec!["writer".to_string()],
            ..ExtractionOptions::default()
        };
        let meta = extract_metadata(&doc(html), &opts);
        assert!(meta.author.is_none());
    }

    #[test]
    fn test_canonical_url_and_hostname() {
        let html = r#"<html><head><link rel="canonical" href="https://site.example/post/1"></head><body></body></html>"#;
        let meta = extract_metadata(&doc(html), &ExtractionOptions::default());
        assert_eq!(meta.url.as_deref(), Some("https://site.example/post/1"));
        assert_eq!(meta.hostname.as_deref(), Some("site.example"));
    }

    #[test]
    fn test_url_falls_back_to_options() {
        let opts = ExtractionOptions {
            url: Some("https://fallback.example/a".to_string()),
            ..ExtractionOptions::default()
        };
        let meta = extract_metadata(&doc("<html><body></body></html>"), &opts);
        assert_eq!(meta.hostname.as_deref(), Some("fallback.example"));
    }

    #[test]
    fn test_date_normalization() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="2023-04-05T10:30:00+02:00">
        </head><body></body></html>"#;
        let meta = extract_metadata(&doc(html), &ExtractionOptions::default());
        assert_eq!(meta.date.as_deref(), Some("2023-04-05"));
    }

    #[test]
    fn test_json_ld_fills_gaps() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@type":"NewsArticle","headline":"LD Headline",
             "author":{"name":"LD Author"},"datePublished":"2022-12-01"}
            </script>
        </head><body></body></html>"#;
        let meta = extract_metadata(&doc(html), &ExtractionOptions::default());
        assert_eq!(meta.title.as_deref(), Some("LD Headline"));
        assert_eq!(meta.author.as_deref(), Some("LD Author"));
        assert_eq!(meta.date.as_deref(), Some("2022-12-01"));
    }

    #[test]
    fn test_categories_and_tags() {
        let html = r#"<html><head>
            <meta property="article:section" content="Tech">
            <meta property="article:tag" content="rust">
            <meta property="article:tag" content="parsing">
        </head><body></body></html>"#;
        let meta = extract_metadata(&doc(html), &ExtractionOptions::default());
        assert_eq!(meta.categories, vec!["Tech"]);
        assert_eq!(meta.tags, vec!["rust", "parsing"]);
    }

    #[test]
    fn test_language_from_html_lang() {
        let html = r#"<html lang="en-US"><body></body></html>"#;
        let meta = extract_metadata(&doc(html), &ExtractionOptions::default());
        assert_eq!(meta.language.as_deref(), Some("en"));
    }
}
