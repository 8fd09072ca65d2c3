//! Owned document tree used by the extractor and the converter.
//!
//! The tree is a plain value: parsing produces it, extraction filters it and
//! conversion walks it. Nothing holds references into a parser's arena after
//! [`crate::html`] returns.

use std::ops::Deref;

use indexmap::IndexMap;

use crate::utilities::{is_raw_text, is_void};

/// Kind of a node in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element with a tag name, attributes and children
    Element,
    /// Character data
    Text,
    /// Root of a parsed document or fragment
    Document,
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub node_type: NodeType,

    /// Lowercase tag name for elements, `#text` or `#document` otherwise
    pub name: String,

    /// Decoded character data for text nodes
    pub value: Option<String>,

    /// Attributes in source order
    pub attributes: IndexMap<String, String>,

    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            name: tag_name.to_lowercase(),
            value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut node = Self::element(tag_name);
        for (name, value) in attrs {
            node.set_attr(name, value);
        }
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            name: "#text".to_string(),
            value: Some(content.to_string()),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create an empty document root
    pub fn document() -> Self {
        Self {
            node_type: NodeType::Document,
            name: "#document".to_string(),
            value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Tag name (lowercase); `#text`/`#document` for non-elements
    pub fn tag_name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_lowercase(), value.to_string());
    }

    /// Whitespace-separated tokens of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.node_type {
            NodeType::Text => out.push_str(self.value.as_deref().unwrap_or("")),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// First node in document order (self included) matching the predicate
    pub fn find<F>(&self, predicate: F) -> Option<&Node>
    where
        F: Fn(&Node) -> bool + Copy,
    {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }

    /// Serialise this node as HTML
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }

    /// Serialise the children of this node as HTML
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        let raw = is_raw_text(self.tag_name());
        for child in &self.children {
            child.write_html(&mut out, raw);
        }
        out
    }

    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self.node_type {
            NodeType::Text => {
                let text = self.value.as_deref().unwrap_or("");
                if raw_text {
                    out.push_str(text);
                } else {
                    escape_html_text(text, out);
                }
            }
            NodeType::Element => {
                out.push('<');
                out.push_str(&self.name);
                for (name, value) in &self.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_html_attr(value, out);
                    out.push('"');
                }
                out.push('>');

                if is_void(&self.name) {
                    return;
                }

                out.push_str(&self.inner_html());
                out.push_str("</");
                out.push_str(&self.name);
                out.push('>');
            }
            NodeType::Document => out.push_str(&self.inner_html()),
        }
    }
}

fn escape_html_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_html_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// A node together with its position in the tree.
///
/// Parents live on the stack of the tree walk, so a `NodeRef` can look up
/// its ancestors and siblings without the tree storing parent pointers.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub node: &'a Node,
    parent: Option<&'a NodeRef<'a>>,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Create a root reference without parent context
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
        }
    }

    /// Reference to the `index`-th child of this node
    pub fn child(&'a self, index: usize) -> Option<NodeRef<'a>> {
        self.node.children.get(index).map(|node| NodeRef {
            node,
            parent: Some(self),
            index,
        })
    }

    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Tag name of the parent element, if any
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent.map(|p| p.node.tag_name())
    }

    /// Walk up the ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &'a NodeRef<'a>> {
        std::iter::successors(self.parent, |p| p.parent)
    }

    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestors().any(|a| a.node.tag_name() == tag)
    }

    /// Position among the parent's children
    pub fn index(&self) -> usize {
        self.index
    }

    fn siblings(&self) -> &'a [Node] {
        self.parent.map_or(&[], |p| p.node.children.as_slice())
    }

    pub fn previous_sibling(&self) -> Option<&'a Node> {
        let index = self.index.checked_sub(1)?;
        self.siblings().get(index)
    }

    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.siblings().get(self.index + 1)
    }

    /// Element siblings that come before this node
    pub fn preceding_element_siblings(&self) -> impl Iterator<Item = &'a Node> {
        let siblings = self.siblings();
        siblings[..self.index.min(siblings.len())]
            .iter()
            .filter(|n| n.is_element())
    }

    pub fn next_element_sibling(&self) -> Option<&'a Node> {
        self.siblings()
            .iter()
            .skip(self.index + 1)
            .find(|n| n.is_element())
    }
}

impl Deref for NodeRef<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element() {
        let node = Node::element("DIV");
        assert!(node.is_element());
        assert_eq!(node.tag_name(), "div");
    }

    #[test]
    fn test_create_text() {
        let node = Node::text("Hello World");
        assert!(node.is_text());
        assert_eq!(node.text_content(), "Hello World");
    }

    #[test]
    fn test_attributes() {
        let node = Node::element_with_attrs(
            "a",
            vec![("href", "https://example.com"), ("TITLE", "Example")],
        );
        assert_eq!(node.attr("href"), Some("https://example.com"));
        assert_eq!(node.attr("title"), Some("Example"));
        assert_eq!(node.attr("class"), None);
    }

    #[test]
    fn test_classes() {
        let node = Node::element_with_attrs("div", vec![("class", "  post main-menu ")]);
        assert!(node.has_class("post"));
        assert!(node.has_class("main-menu"));
        assert!(!node.has_class("menu"));
    }

    #[test]
    fn test_text_content() {
        let mut div = Node::element("div");
        div.add_child(Node::text("Hello "));
        let mut span = Node::element("span");
        span.add_child(Node::text("World"));
        div.add_child(span);

        assert_eq!(div.text_content(), "Hello World");
    }

    #[test]
    fn test_outer_html_escapes() {
        let mut a = Node::element_with_attrs("a", vec![("href", "/q?a=1&b=\"2\"")]);
        a.add_child(Node::text("1 < 2 & 3"));

        assert_eq!(
            a.outer_html(),
            "<a href=\"/q?a=1&amp;b=&quot;2&quot;\">1 &lt; 2 &amp; 3</a>"
        );
    }

    #[test]
    fn test_void_and_raw_text_elements() {
        let img = Node::element_with_attrs("img", vec![("src", "test.png"), ("alt", "Test")]);
        assert_eq!(img.outer_html(), "<img src=\"test.png\" alt=\"Test\">");

        let mut script = Node::element("script");
        script.add_child(Node::text("if (a < b) {}"));
        assert_eq!(script.outer_html(), "<script>if (a < b) {}</script>");
    }

    #[test]
    fn test_find_in_document_order() {
        let mut root = Node::document();
        let mut outer = Node::element_with_attrs("div", vec![("id", "outer")]);
        outer.add_child(Node::element_with_attrs("div", vec![("id", "inner")]));
        root.add_child(outer);

        let found = root.find(|n| n.tag_name() == "div");
        assert_eq!(found.and_then(|n| n.attr("id")), Some("outer"));
    }

    #[test]
    fn test_node_ref_siblings() {
        let mut ul = Node::element("ul");
        ul.add_child(Node::element("li"));
        ul.add_child(Node::text(" "));
        ul.add_child(Node::element("li"));

        let root = NodeRef::new(&ul);
        let first = root.child(0).unwrap();
        let last = root.child(2).unwrap();

        assert_eq!(first.parent_tag(), Some("ul"));
        assert!(first.next_element_sibling().is_some());
        assert!(last.next_element_sibling().is_none());
        assert_eq!(last.preceding_element_siblings().count(), 1);
        assert!(last.previous_sibling().is_some_and(Node::is_text));
    }
}
