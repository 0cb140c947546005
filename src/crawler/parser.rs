//! HTML parser for extracting page structure
//!
//! This module turns a raw document into the facts recorded per page:
//! - Markup version (heuristic, see `detect_markup_version`)
//! - Title and per-level heading counts
//! - Login-form presence
//! - Anchor targets resolved against the page URL
//!
//! Parsing is pure; probing the extracted links happens in `prober`.

use crate::model::{HeadingCounts, MarkupVersion, HEADING_LEVELS};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub markup_version: MarkupVersion,

    /// Text of the first `<title>`, empty if absent
    pub title: String,

    pub headings: HeadingCounts,

    pub has_login_form: bool,

    /// Anchor targets in document order, duplicates kept
    pub links: Vec<DocumentLink>,

    /// Anchors dropped for an empty or unresolvable href
    pub skipped_anchors: usize,
}

/// An anchor target, as written and as resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// The `href` attribute text
    pub href: String,

    /// `href` resolved against the page URL
    pub url: Url,
}

/// Parses HTML content and extracts the page structure
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL, used to resolve relative hrefs
///
/// # Example
///
/// ```no_run
/// use pagelens::crawler::parse_document;
/// use url::Url;
///
/// let html = r#"<!DOCTYPE html><html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_document(html, &base_url);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links.len(), 1);
/// ```
pub fn parse_document(html: &str, base_url: &Url) -> ParsedDocument {
    let document = Html::parse_document(html);
    let (links, skipped_anchors) = extract_links(&document, base_url);

    ParsedDocument {
        markup_version: detect_markup_version(&document),
        title: extract_title(&document),
        headings: count_headings(&document),
        has_login_form: detect_login_form(&document),
        links,
        skipped_anchors,
    }
}

/// Infers the markup version
///
/// Root-element checks run first: an `xmlns` containing "xhtml" means XHTML,
/// otherwise a non-empty `lang` means HTML5. A DOCTYPE as the first node of
/// the document then forces HTML5 regardless of the root element.
fn detect_markup_version(document: &Html) -> MarkupVersion {
    let root = document.root_element();
    let mut version = MarkupVersion::Unknown;

    if root.value().name() == "html" {
        if root
            .value()
            .attr("xmlns")
            .is_some_and(|ns| ns.contains("xhtml"))
        {
            version = MarkupVersion::Xhtml;
        } else if root.value().attr("lang").is_some_and(|lang| !lang.is_empty()) {
            version = MarkupVersion::Html5;
        }
    }

    if starts_with_doctype(document) {
        version = MarkupVersion::Html5;
    }

    version
}

fn starts_with_doctype(document: &Html) -> bool {
    document
        .tree
        .root()
        .first_child()
        .is_some_and(|node| node.value().is_doctype())
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default()
}

fn count_headings(document: &Html) -> HeadingCounts {
    let mut headings = HeadingCounts::new();

    for (index, tag) in HEADING_LEVELS.iter().enumerate() {
        if let Ok(selector) = Selector::parse(tag) {
            let count = document.select(&selector).count();
            headings.set(index + 1, u32::try_from(count).unwrap_or(u32::MAX));
        }
    }

    headings
}

/// True iff some `<form>` contains a descendant `<input type="password">`
fn detect_login_form(document: &Html) -> bool {
    let (Ok(form_selector), Ok(input_selector)) =
        (Selector::parse("form"), Selector::parse("input"))
    else {
        return false;
    };

    document
        .select(&form_selector)
        .any(|form| has_password_input(form, &input_selector))
}

fn has_password_input(form: ElementRef<'_>, input_selector: &Selector) -> bool {
    form.select(input_selector)
        .any(|input| input.value().attr("type") == Some("password"))
}

/// Extracts and resolves every anchor target from the HTML document
///
/// Returns the resolved links plus the number of anchors skipped because
/// their href was empty or could not be resolved against `base_url`.
fn extract_links(document: &Html, base_url: &Url) -> (Vec<DocumentLink>, usize) {
    let mut links = Vec::new();
    let mut skipped = 0;

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return (links, skipped);
    };

    for element in document.select(&a_selector) {
        let href = element.value().attr("href").unwrap_or_default();
        match resolve_link(href, base_url) {
            Some(url) => links.push(DocumentLink {
                href: href.to_string(),
                url,
            }),
            None => {
                tracing::debug!("Skipping anchor with unusable href {:?}", href);
                skipped += 1;
            }
        }
    }

    (links, skipped)
}

/// Resolves a link href to an absolute URL
///
/// Returns None for an empty href or one that does not resolve.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    if href.is_empty() {
        return None;
    }

    base_url.join(href).ok()
}
