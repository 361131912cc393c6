// src/audit/page.rs
// =============================================================================
// This module turns raw HTML into the two things the checks look at:
// - the full text of the page, lower-cased
// - the visible text of every <a> element (the "anchor labels")
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Is built on html5ever, so broken markup still produces a tree
//
// Parsing never fails. Garbage in simply means less text and fewer anchors.
// =============================================================================

use scraper::{ElementRef, Html};

// The parsed content of one fetched journal page
//
// Owned by a single audit and dropped as soon as the report is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// Every text node of the document joined together, lower-cased
    pub text_content: String,
    /// Direct text of each anchor element, in document order (empty ones skipped)
    pub anchors: Vec<String>,
}

impl FetchedPage {
    // Builds a FetchedPage from an HTML string
    //
    // Example:
    //   html = "<p>ISSN 1234-5678</p><a>Editorial Board</a>"
    //   text_content = "issn 1234-5678editorial board"
    //   anchors = ["Editorial Board"]
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let text_content = root.text().collect::<String>().to_lowercase();

        let anchors = root
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name() == "a")
            .map(direct_text)
            .filter(|label| !label.trim().is_empty())
            .collect();

        FetchedPage {
            text_content,
            anchors,
        }
    }
}

// Collects only the text nodes that are immediate children of the element.
// Text inside nested tags (<span>, <img alt>, ...) is not part of the label.
fn direct_text(element: ElementRef<'_>) -> String {
    let mut label = String::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            label.push_str(text);
        }
    }
    label
}
