//! HTML metadata extraction
//!
//! This module pulls the page-level metadata reported for matching sites:
//! - Page title (from the `<title>` tag)
//! - Description (`<meta name="description">`, falling back to `og:description`)
//! - Language (`<html lang>`, falling back to `Content-Language`)

use scraper::{Html, Selector};

/// Metadata extracted from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
}

/// Parses an HTML document and extracts its metadata
///
/// # Example
///
/// ```
/// use rankcrawl::crawler::parse_page;
///
/// let html = r#"<html lang="en"><head><title>Test</title></head><body></body></html>"#;
/// let info = parse_page(html);
/// assert_eq!(info.title, Some("Test".to_string()));
/// assert_eq!(info.language, Some("en".to_string()));
/// ```
pub fn parse_page(html: &str) -> PageInfo {
    let document = Html::parse_document(html);

    PageInfo {
        title: extract_title(&document),
        description: extract_description(&document),
        language: extract_language(&document),
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

fn extract_description(document: &Html) -> Option<String> {
    meta_content(document, "name", "description")
        .or_else(|| meta_content(document, "property", "og:description"))
}

fn extract_language(document: &Html) -> Option<String> {
    let html_selector = Selector::parse("html[lang]").ok()?;

    document
        .select(&html_selector)
        .next()
        .and_then(|element| element.value().attr("lang"))
        .map(|lang| lang.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| meta_content(document, "http-equiv", "content-language"))
}

/// Finds the `content` of the first `<meta>` whose `attr` equals `value`
/// (ASCII case-insensitive)
fn meta_content(document: &Html, attr: &str, value: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[{}][content]", attr)).ok()?;

    document
        .select(&selector)
        .find(|element| {
            element
                .value()
                .attr(attr)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
        })
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}
