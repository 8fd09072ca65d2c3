//! Converter - the main entry point for HTML to Markdown conversion.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{instrument, warn};

use crate::html::parse_html;
use crate::node::{Node, NodeRef};
use crate::options::Options;
use crate::rules::{strikethrough, Filter, Rule, Rules};
use crate::utilities::{collapse_whitespace, escape_markdown, is_blank, is_block, join};
use crate::{ConvertError, Result};

/// Returned by [`Converter::convert`] instead of Markdown when conversion fails
pub const ERROR_SENTINEL: &str = "Error converting HTML to Markdown";

/// Elements nested deeper than this abort the conversion
pub const MAX_DEPTH: usize = 512;

/// Converts HTML to Markdown by walking the document tree and applying the
/// first matching rule to every element.
pub struct Converter {
    options: Options,
    rules: Rules,
}

impl Converter {
    /// Create a new Converter with default options and only the built-in rules
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            rules: Rules::new(),
        }
    }

    /// Create a Converter with custom options
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// The converter used by the pipeline: ATX headings, fenced code blocks
    /// and the `strikethrough` custom rule.
    pub fn standard() -> Self {
        let mut converter = Self::new();
        converter.add_rule("strikethrough", strikethrough());
        converter
    }

    /// Convert HTML to Markdown, returning [`ERROR_SENTINEL`] on failure.
    #[instrument(skip_all, fields(len = html.len()))]
    pub fn convert(&self, html: &str) -> String {
        match catch_unwind(AssertUnwindSafe(|| self.try_convert(html))) {
            Ok(Ok(markdown)) => markdown,
            Ok(Err(err)) => {
                warn!(error = %err, "HTML to Markdown conversion failed");
                ERROR_SENTINEL.to_string()
            }
            Err(_) => {
                warn!("HTML to Markdown conversion panicked");
                ERROR_SENTINEL.to_string()
            }
        }
    }

    /// Convert an HTML string to Markdown
    pub fn try_convert(&self, html: &str) -> Result<String> {
        let root = parse_html(html);
        self.convert_node(&root)
    }

    /// Convert a Node tree to Markdown
    pub fn convert_node(&self, node: &Node) -> Result<String> {
        let root = NodeRef::new(node);
        let output = if node.is_element() {
            self.process_node(&root, 0)?
        } else {
            self.process_children(&root, 0)?
        };

        Ok(post_process(&output))
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Process children of a node
    fn process_children(&self, parent: &NodeRef, depth: usize) -> Result<String> {
        let mut output = String::new();
        let in_pre = parent.tag_name() == "pre" || parent.has_ancestor("pre");

        for index in 0..parent.children.len() {
            let Some(child) = parent.child(index) else {
                continue;
            };

            let replacement = if child.is_text() {
                let text = self.process_text(&child, in_pre);
                // Whitespace never doubles up across inline boundaries
                if !in_pre && output.ends_with([' ', '\n']) {
                    text.trim_start_matches(' ').to_string()
                } else {
                    text
                }
            } else if child.is_element() {
                self.process_node(&child, depth + 1)?
            } else {
                String::new()
            };

            join(&mut output, &replacement);
        }

        Ok(output)
    }

    /// Collapse and escape a text node
    fn process_text(&self, node: &NodeRef, in_pre: bool) -> String {
        let text = node.value.as_deref().unwrap_or("");
        if in_pre {
            return text.to_string();
        }

        let mut text = collapse_whitespace(text);

        let parent_is_block = node
            .parent()
            .map_or(true, |p| !p.is_element() || is_block(p.tag_name()));
        let breaks = |sibling: Option<&Node>| match sibling {
            None => parent_is_block,
            Some(n) => n.is_element() && (is_block(n.tag_name()) || n.tag_name() == "br"),
        };

        if breaks(node.previous_sibling()) {
            text = text.trim_start().to_string();
        }
        if breaks(node.next_sibling()) {
            text = text.trim_end().to_string();
        }

        escape_markdown(&text)
    }

    /// Process a single element
    fn process_node(&self, node: &NodeRef, depth: usize) -> Result<String> {
        if depth > MAX_DEPTH {
            return Err(ConvertError::TooDeep(MAX_DEPTH));
        }

        // Check if should be removed
        if self.rules.should_remove(node, &self.options) {
            return Ok(String::new());
        }

        // Check if should be kept as HTML
        if self.rules.should_keep(node, &self.options) {
            return Ok(self.rules.keep_replacement(node));
        }

        let block = is_block(node.tag_name());
        if is_blank(node) {
            return Ok(if block { "\n\n".to_string() } else { String::new() });
        }

        // Process children first
        let content = self.process_children(node, depth)?;

        // Apply rule if one matches
        if let Some(rule) = self.rules.for_node(node, &self.options) {
            return Ok(rule.replace(node, &content, &self.options));
        }

        // Unclaimed block containers become plain blocks, inline ones vanish
        if block {
            Ok(format!("\n\n{content}\n\n"))
        } else {
            Ok(content)
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim the result and cap blank lines at one
fn post_process(output: &str) -> String {
    let result = output
        .trim_start_matches(['\n', '\r', '\t'])
        .trim_end();

    let mut newline_count = 0;
    let mut processed = String::with_capacity(result.len());

    for c in result.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                processed.push(c);
            }
        } else {
            newline_count = 0;
            processed.push(c);
        }
    }

    processed
}
