//! Output format tests.

use textharvest::{
    extract_document, extract_with_options, ExtractionOptions, OutputFormat,
};

const ARTICLE: &str = r#"<html lang="en"><head>
    <title>Page Title</title>
    <meta property="og:title" content="The Article Title">
    <meta name="author" content="Jo Writer">
    <meta property="article:published_time" content="2024-02-10T08:00:00Z">
    <link rel="canonical" href="https://news.example/story/42">
</head><body><article>
    <h2>Section heading</h2>
    <p>First paragraph with <b>bold words</b> inside of it.</p>
    <p>Second paragraph with a <a href="https://news.example/more">link label</a> here.</p>
</article></body></html>"#;

fn fixture_opts() -> ExtractionOptions {
    ExtractionOptions {
        no_fallback: true,
        min_extracted_size: 5,
        ..ExtractionOptions::default()
    }
}

#[test]
fn txt_output_plain() {
    let text = extract_with_options(ARTICLE, &fixture_opts(), OutputFormat::Txt, false).unwrap();
    assert!(text.contains("Section heading"));
    assert!(text.contains("First paragraph with bold words inside of it."));
    assert!(!text.contains("**"));
}

#[test]
fn txt_output_with_formatting_markers() {
    let opts = ExtractionOptions {
        include_formatting: true,
        include_links: true,
        ..fixture_opts()
    };
    let text = extract_with_options(ARTICLE, &opts, OutputFormat::Txt, false).unwrap();
    assert!(text.contains("## Section heading"));
    assert!(text.contains("**bold words**"));
    assert!(text.contains("[link label](https://news.example/more)"));
}

#[test]
fn json_output_carries_metadata_and_text() {
    let json = extract_with_options(ARTICLE, &fixture_opts(), OutputFormat::Json, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "The Article Title");
    assert_eq!(value["author"], "Jo Writer");
    assert_eq!(value["date"], "2024-02-10");
    assert_eq!(value["hostname"], "news.example");
    assert!(value["text"].as_str().unwrap().contains("First paragraph"));
    assert!(value["fingerprint"].as_str().unwrap().len() == 16);
}

#[test]
fn xml_output_serializes_vocabulary() {
    let xml = extract_with_options(ARTICLE, &fixture_opts(), OutputFormat::Xml, false).unwrap();
    assert!(xml.starts_with("<doc"));
    assert!(xml.contains(r#"title="The Article Title""#));
    assert!(xml.contains("<main>"));
    assert!(xml.contains("<head rend=\"h2\">Section heading</head>"));
    assert!(xml.contains("<hi rend=\"bold\">bold words</hi>"));
    assert!(xml.ends_with("</doc>"));
}

#[test]
fn tei_output_has_header_and_body() {
    let tei = extract_with_options(ARTICLE, &fixture_opts(), OutputFormat::XmlTei, true).unwrap();
    assert!(tei.starts_with(r#"<TEI xmlns="http://www.tei-c.org/ns/1.0">"#));
    assert!(tei.contains("<title>The Article Title</title>"));
    assert!(tei.contains("<body>"));
    assert!(tei.contains("Section heading"));
    assert!(tei.ends_with("</TEI>"));
}

#[test]
fn csv_output_is_tab_separated() {
    let csv = extract_with_options(ARTICLE, &fixture_opts(), OutputFormat::Csv, false).unwrap();
    let fields: Vec<&str> = csv.split('\t').collect();
    assert_eq!(fields.len(), 8);
    assert_eq!(fields[0], "https://news.example/story/42");
    assert!(fields[6].contains("First paragraph"));
    // embedded newlines are flattened into the single record line
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn protocol_relative_image_source_rewritten() {
    let html = r#"<html><body><article>
        <p>Paragraph before the picture with some text.</p>
        <p><img src="//cdn/img.jpg" alt="shot"></p>
    </article></body></html>"#;
    let opts = ExtractionOptions {
        include_images: true,
        ..fixture_opts()
    };
    let doc = extract_document(html, &opts).unwrap();
    let (tree, body) = doc.body();
    let graphics = tree.iter_tags(body, &["graphic"]);
    assert_eq!(graphics.len(), 1);
    assert_eq!(tree.attr(graphics[0], "src"), Some("http://cdn/img.jpg"));
}

#[test]
fn xml_reextraction_reproduces_paragraphs() {
    // running extraction over its own XML body reproduces the blocks
    let xml = extract_with_options(ARTICLE, &fixture_opts(), OutputFormat::Xml, false).unwrap();
    let wrapped = format!("<html><body><article>{xml}</article></body></html>");
    let opts = ExtractionOptions {
        no_fallback: true,
        min_extracted_size: 5,
        ..ExtractionOptions::default()
    };
    let doc = extract_document(&wrapped, &opts).unwrap();
    assert!(doc.raw_text.contains("First paragraph with bold words inside of it."));
    assert!(doc.raw_text.contains("Second paragraph with a link label here."));
}
