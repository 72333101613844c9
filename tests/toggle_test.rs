//! Feature-toggle laws: monotone gating and precision/recall ordering.

use textharvest::{extract_document, ExtractionOptions};

fn base_opts() -> ExtractionOptions {
    ExtractionOptions {
        no_fallback: true,
        min_extracted_size: 5,
        ..ExtractionOptions::default()
    }
}

const FIXTURE: &str = r#"<html><body><article>
    <p>Opening paragraph with an <a href="http://x.example/ref">inline link label</a> and
    trailing words to give the block some weight.</p>
    <table><tr><td>alpha</td><td>beta</td></tr></table>
    <p><img src="http://cdn.example/pic.jpg" alt="picture"></p>
    <p>Closing paragraph with additional plain words in it.</p>
</article></body></html>"#;

fn element_count(opts: &ExtractionOptions) -> usize {
    let doc = extract_document(FIXTURE, opts).unwrap();
    let (tree, body) = doc.body();
    tree.descendants(body).len()
}

#[test]
fn tables_toggle_is_monotone() {
    let with_tables = element_count(&base_opts());
    let without_tables = element_count(&ExtractionOptions {
        include_tables: false,
        ..base_opts()
    });
    assert!(with_tables >= without_tables);
}

#[test]
fn images_toggle_is_monotone() {
    let with_images = element_count(&ExtractionOptions {
        include_images: true,
        ..base_opts()
    });
    let without_images = element_count(&base_opts());
    assert!(with_images >= without_images);
}

#[test]
fn links_toggle_is_monotone() {
    let with_links = element_count(&ExtractionOptions {
        include_links: true,
        ..base_opts()
    });
    let without_links = element_count(&base_opts());
    assert!(with_links >= without_links);
}

#[test]
fn no_graphic_without_include_images() {
    let doc = extract_document(FIXTURE, &base_opts()).unwrap();
    let (tree, body) = doc.body();
    assert!(tree.iter_tags(body, &["graphic"]).is_empty());
}

#[test]
fn graphic_present_with_include_images() {
    let opts = ExtractionOptions {
        include_images: true,
        ..base_opts()
    };
    let doc = extract_document(FIXTURE, &opts).unwrap();
    let (tree, body) = doc.body();
    let graphics = tree.iter_tags(body, &["graphic"]);
    assert!(!graphics.is_empty());
    assert_eq!(
        tree.attr(graphics[0], "src"),
        Some("http://cdn.example/pic.jpg")
    );
}

#[test]
fn no_ref_without_include_links() {
    let doc = extract_document(FIXTURE, &base_opts()).unwrap();
    let (tree, body) = doc.body();
    assert!(tree.iter_tags(body, &["ref"]).is_empty());
    // the link text itself survives
    assert!(doc.raw_text.contains("inline link label"));
}

#[test]
fn ref_present_with_include_links() {
    let opts = ExtractionOptions {
        include_links: true,
        ..base_opts()
    };
    let doc = extract_document(FIXTURE, &opts).unwrap();
    let (tree, body) = doc.body();
    let refs = tree.iter_tags(body, &["ref"]);
    assert!(!refs.is_empty());
    assert_eq!(tree.attr(refs[0], "target"), Some("http://x.example/ref"));
}

#[test]
fn precision_recall_length_ordering() {
    let long_link = "A fairly long single link caption dominating its box";
    let html = format!(
        r#"<html><body><div class="post-content">
        <p>First body paragraph with a decent amount of running text.</p>
        <p><a href="/promo">{long_link}</a></p>
        <p>Last body paragraph with a decent amount of running text.</p>
    </div></body></html>"#
    );

    let default_len = extract_document(&html, &base_opts())
        .map(|doc| doc.raw_text.chars().count())
        .unwrap_or(0);
    let precision_len = extract_document(
        &html,
        &ExtractionOptions {
            favor_precision: true,
            ..base_opts()
        },
    )
    .map(|doc| doc.raw_text.chars().count())
    .unwrap_or(0);
    let recall_len = extract_document(
        &html,
        &ExtractionOptions {
            favor_recall: true,
            ..base_opts()
        },
    )
    .map(|doc| doc.raw_text.chars().count())
    .unwrap_or(0);

    assert!(recall_len >= default_len);
    assert!(default_len >= precision_len);
    // precision drops the link-dominated paragraph
    assert!(precision_len < default_len);
}
