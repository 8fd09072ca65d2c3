//! HTML parsing support.
//!
//! Parses HTML strings with `scraper` (html5ever) and copies the result into
//! the owned [`Node`] tree. The parser is lenient: unclosed tags, missing
//! `<html>`/`<body>` and broken attributes are repaired the way browsers
//! repair them, so parsing never fails.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Elements nested deeper than this are flattened to their text
pub const MAX_TREE_DEPTH: usize = 1024;

/// Parse an HTML fragment into a document node holding the fragment's
/// top-level nodes.
///
/// # Example
///
/// ```rust
/// use readmark::{parse_html, Converter};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
/// let markdown = Converter::new().convert_node(&node).unwrap();
/// assert_eq!(markdown, "# Hello *World*");
/// ```
pub fn parse_html(html: &str) -> Node {
    let fragment = Html::parse_fragment(html);

    // The fragment parser wraps everything in a synthetic <html> element
    let mut root = Node::document();
    root.children = scraper_to_node(fragment.root_element(), 0).children;
    root
}

/// Parse a full HTML document. The result is a document node with a single
/// `html` child; `head` and `body` are synthesised when missing.
pub fn parse_document(html: &str) -> Node {
    let document = Html::parse_document(html);

    let mut root = Node::document();
    root.add_child(scraper_to_node(document.root_element(), 0));
    root
}

/// Convert a scraper ElementRef to our Node structure
pub(crate) fn scraper_to_node(element: ElementRef, depth: usize) -> Node {
    let tag = element.value().name();

    let mut node = Node::element_with_attrs(tag, element.value().attrs().collect());

    if depth >= MAX_TREE_DEPTH {
        let text: String = element.text().collect();
        node.add_child(Node::text(&text));
        return node;
    }

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                node.add_child(Node::text(&text.text));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(scraper_to_node(child_element, depth + 1));
                }
            }
            // Comments, doctypes and processing instructions carry no content
            _ => {}
        }
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment() {
        let node = parse_html("<p>Hello World</p>");
        assert!(!node.is_element());
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].tag_name(), "p");
    }

    #[test]
    fn test_parse_document_synthesises_body() {
        let node = parse_document("<p>Hello</p>");
        let body = node.find(|n| n.tag_name() == "body");
        assert_eq!(body.map(Node::inner_html).as_deref(), Some("<p>Hello</p>"));
    }

    #[test]
    fn test_lenient_parsing() {
        let node = parse_html("<div><p>unclosed <b>bold</div><span class=>x");
        assert!(node.find(|n| n.tag_name() == "b").is_some());
        assert_eq!(node.text_content(), "unclosed boldx");
    }

    #[test]
    fn test_comments_dropped() {
        let node = parse_html("<p>a<!-- hidden -->b</p>");
        assert_eq!(node.text_content(), "ab");
    }

    #[test]
    fn test_entities_decoded() {
        let node = parse_html("<p>1 &lt; 2 &amp;&amp; 3</p>");
        assert_eq!(node.text_content(), "1 < 2 && 3");
    }

    #[test]
    fn test_deep_nesting_is_flattened() {
        let html = format!("{}deep{}", "<span>".repeat(2000), "</span>".repeat(2000));
        let node = parse_html(&html);
        assert_eq!(node.text_content(), "deep");
    }
}
