//! HTML extraction
//!
//! One synchronous pass over the parsed document collecting everything the
//! pipeline needs as owned data, so no parser state lives across await
//! points. Malformed HTML degrades to empty element sets; extraction itself
//! never fails.

use crate::image::ImageSource;
use scraper::{Html, Selector};
use tracing::debug;

/// An anchor as found in the document, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorRef {
    /// Raw href attribute, empty when absent
    pub href: String,
    /// Text content of the anchor element
    pub text: String,
}

/// Everything the pipeline reads out of one document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub title: Option<String>,
    pub images: Vec<ImageSource>,
    pub anchors: Vec<AnchorRef>,
}

/// Parse a document and collect its title, image references and anchors in
/// document order.
pub fn parse_document(html: &str) -> ParsedDocument {
    let document = Html::parse_document(html);

    let images = image_selector()
        .map(|selector| {
            document
                .select(&selector)
                .map(|el| ImageSource {
                    src: non_empty_attr(&el, "src"),
                    data_src: non_empty_attr(&el, "data-src"),
                    data_fallback_src: non_empty_attr(&el, "data-fallback-src"),
                })
                .collect()
        })
        .unwrap_or_default();

    let anchors = anchor_selector()
        .map(|selector| {
            document
                .select(&selector)
                .map(|el| AnchorRef {
                    href: el.value().attr("href").unwrap_or_default().to_string(),
                    text: el.text().collect::<String>(),
                })
                .collect()
        })
        .unwrap_or_default();

    let parsed = ParsedDocument {
        title: extract_title(&document),
        images,
        anchors,
    };
    debug!(
        "Parsed document: {} images, {} anchors",
        parsed.images.len(),
        parsed.anchors.len()
    );
    parsed
}

/// Extract the page title, treating an empty `<title>` as absent.
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn image_selector() -> Option<Selector> {
    Selector::parse("img").ok()
}

fn anchor_selector() -> Option<Selector> {
    Selector::parse("a").ok()
}

fn non_empty_attr(el: &scraper::ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .filter(|value| !value.is_empty())
        .map(String::from)
}
