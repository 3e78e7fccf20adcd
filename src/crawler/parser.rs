//! HTML parser for extracting hrefs and text
//!
//! Links are returned raw (not resolved against any base) because the
//! classifier and canonicalizer work on the link as written in the page.

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// `href` of every `<a>` element, then of every `<area>` element;
    /// `None` for elements without the attribute
    pub hrefs: Vec<Option<String>>,
}

/// Parses HTML and extracts the title and raw hrefs
///
/// # Example
///
/// ```
/// use onion_sift::crawler::parse_page;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_page(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.hrefs, vec![Some("/page".to_string())]);
/// ```
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        hrefs: collect_hrefs(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects hrefs of anchors and image-map areas, in that order
fn collect_hrefs(document: &Html) -> Vec<Option<String>> {
    let mut hrefs = Vec::new();

    for tag in ["a", "area"] {
        if let Ok(selector) = Selector::parse(tag) {
            for element in document.select(&selector) {
                hrefs.push(element.value().attr("href").map(|s| s.trim().to_string()));
            }
        }
    }

    hrefs
}

/// Extracts visible text, dropping `<script>` and `<style>` content
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let skip = Selector::parse("script, style, noscript").ok();

    let skipped: Vec<_> = match &skip {
        Some(selector) => document.select(selector).map(|e| e.id()).collect(),
        None => Vec::new(),
    };

    let mut words = Vec::new();
    for node in document.tree.nodes() {
        if let Some(text) = node.value().as_text() {
            let hidden = node.ancestors().any(|a| skipped.contains(&a.id()));
            if hidden {
                continue;
            }
            words.extend(text.split_whitespace().map(|w| w.to_string()));
        }
    }

    words.join(" ")
}
