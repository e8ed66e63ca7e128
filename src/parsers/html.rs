use crate::parsers::{Reference, ReferenceKind};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Script types that are fetched as JavaScript
const SCRIPT_TYPES: [&str; 3] = ["text/javascript", "application/javascript", "module"];

/// Parses HTML content and extracts references to subsidiary resources.
///
/// References come grouped by kind (images, stylesheets, frames, scripts),
/// in document order within each group, with repeats removed.
pub fn extract_references(html: &str) -> Vec<Reference> {
    let doc = Html::parse_document(html);

    let mut references = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |reference: Reference| {
        if seen.insert(reference.clone()) {
            references.push(reference);
        }
    };

    let img_selector = Selector::parse("img").unwrap();
    for src in doc.select(&img_selector).filter_map(|e| e.value().attr("src")) {
        push(Reference::new(ReferenceKind::Image, src));
    }

    let link_selector = Selector::parse("link").unwrap();
    for link in doc.select(&link_selector).filter(is_stylesheet_link) {
        if let Some(href) = link.value().attr("href") {
            push(Reference::new(ReferenceKind::Stylesheet, href));
        }
    }

    let iframe_selector = Selector::parse("iframe").unwrap();
    for src in doc.select(&iframe_selector).filter_map(|e| e.value().attr("src")) {
        push(Reference::new(ReferenceKind::Frame, src));
    }

    let script_selector = Selector::parse("script").unwrap();
    for script in doc.select(&script_selector).filter(is_javascript) {
        if let Some(src) = script.value().attr("src") {
            push(Reference::new(ReferenceKind::Script, src));
        }
    }

    ::log::debug!("HTML parser found {} references", references.len());
    references
}

/// Extracts the text of the document's title element
pub fn title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let title_selector = Selector::parse("head title").unwrap();

    let element = doc.select(&title_selector).next()?;
    let text = element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() { None } else { Some(text) }
}

/// `<link type="text/css">` or `<link rel="stylesheet">`
fn is_stylesheet_link(link: &ElementRef<'_>) -> bool {
    let element = link.value();
    let typed_css = element
        .attr("type")
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("text/css"));
    let rel_stylesheet = element.attr("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    });
    typed_css || rel_stylesheet
}

fn is_javascript(script: &ElementRef<'_>) -> bool {
    match script.value().attr("type") {
        None => true,
        Some(t) => {
            let t = t.trim();
            SCRIPT_TYPES.iter().any(|known| t.eq_ignore_ascii_case(known))
        }
    }
}
