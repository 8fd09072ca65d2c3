//! Utility functions and constants for HTML processing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::Node;

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frameset", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "html", "isindex", "li",
    "main", "menu", "nav", "noframes", "noscript", "ol", "output", "p", "pre",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead",
    "tr", "ul",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements that have meaning even when blank
pub const MEANINGFUL_WHEN_BLANK: &[&str] = &[
    "a", "table", "thead", "tbody", "tfoot", "th", "td", "iframe", "script",
    "audio", "video",
];

/// Elements whose text content is serialised without entity escaping
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is meaningful when blank
pub fn is_meaningful_when_blank(tag: &str) -> bool {
    MEANINGFUL_WHEN_BLANK.contains(&tag.to_lowercase().as_str())
}

pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// An element is blank when it has no text, is not meaningful when blank and
/// contains no void or meaningful-when-blank descendants.
pub fn is_blank(node: &Node) -> bool {
    !is_void(node.tag_name())
        && !is_meaningful_when_blank(node.tag_name())
        && node.text_content().trim().is_empty()
        && node
            .find(|n| is_void(n.tag_name()) || is_meaningful_when_blank(n.tag_name()))
            .is_none()
}

struct Escape {
    pattern: Regex,
    replacement: &'static str,
}

static ESCAPES: Lazy<Vec<Escape>> = Lazy::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"(?m)^-", r"\-"),
        (r"(?m)^\+ ", r"\+ "),
        (r"(?m)^(=+)", r"\$1"),
        (r"(?m)^(#{1,6}) ", r"\$1 "),
        (r"`", r"\`"),
        (r"(?m)^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"(?m)^>", r"\>"),
        (r"_", r"\_"),
        (r"(?m)^(\d+)\. ", r"$1\. "),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| {
        Regex::new(pattern)
            .ok()
            .map(|pattern| Escape { pattern, replacement })
    })
    .collect()
});

/// Escape text that would otherwise be read as Markdown syntax
pub fn escape_markdown(text: &str) -> String {
    ESCAPES.iter().fold(text.to_string(), |acc, escape| {
        escape
            .pattern
            .replace_all(&acc, escape.replacement)
            .into_owned()
    })
}

/// Collapse runs of whitespace into a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        // Non-breaking spaces are content, not layout
        if c.is_whitespace() && c != '\u{a0}' {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Wrap content in a delimiter, keeping leading and trailing spaces outside
/// of it: `" bold "` becomes `" **bold** "`.
pub fn wrap_flanking(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{leading}{delimiter}{trimmed}{delimiter}{trailing}")
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Longest run of `c` in `s`
pub fn longest_run(s: &str, c: char) -> usize {
    s.chars()
        .fold((0, 0), |(max, current), ch| {
            if ch == c {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}

/// Append `replacement` to `output`, collapsing the newlines where they meet
/// to the larger of the two runs (at most one blank line).
pub fn join(output: &mut String, replacement: &str) {
    let kept = output.trim_end_matches('\n').len();
    let trailing = output.len() - kept;
    output.truncate(kept);

    let body = replacement.trim_start_matches('\n');
    let leading = replacement.len() - body.len();

    let separator = trailing.max(leading).min(2);
    if trailing == 0 && separator > 0 {
        // Spaces before a line break are noise once the break is emitted
        let trimmed = output.trim_end_matches([' ', '\t']).len();
        output.truncate(trimmed);
    }
    output.push_str(&"\n".repeat(separator));
    output.push_str(body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("*test*"), "\\*test\\*");
        assert_eq!(escape_markdown("snake_case"), "snake\\_case");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
        assert_eq!(escape_markdown("normal"), "normal");
    }

    #[test]
    fn test_escape_line_start_only() {
        assert_eq!(escape_markdown("# not a heading"), "\\# not a heading");
        assert_eq!(escape_markdown("issue #5"), "issue #5");
        assert_eq!(escape_markdown("- item"), "\\- item");
        assert_eq!(escape_markdown("well-known"), "well-known");
        assert_eq!(escape_markdown("1. first"), "1\\. first");
        assert_eq!(escape_markdown("> quote"), "\\> quote");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert_eq!(collapse_whitespace("  a  "), " a ");
    }

    #[test]
    fn test_wrap_flanking() {
        assert_eq!(wrap_flanking(" bold ", "**"), " **bold** ");
        assert_eq!(wrap_flanking("x", "*"), "*x*");
        assert_eq!(wrap_flanking("   ", "*"), "");
    }

    #[test]
    fn test_join_collapses_newlines() {
        let mut out = String::from("a\n\n");
        join(&mut out, "\n\nb");
        assert_eq!(out, "a\n\nb");

        let mut out = String::from("a  ");
        join(&mut out, "\nb");
        assert_eq!(out, "a\nb");

        let mut out = String::from("a ");
        join(&mut out, "b");
        assert_eq!(out, "a b");
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run("a ``` b ` c", '`'), 3);
        assert_eq!(longest_run("none", '`'), 0);
    }

    #[test]
    fn test_is_block() {
        assert!(is_block("div"));
        assert!(is_block("DIV"));
        assert!(!is_block("span"));
    }

    #[test]
    fn test_is_blank() {
        let mut p = Node::element("p");
        p.add_child(Node::text("  "));
        assert!(is_blank(&p));

        p.add_child(Node::element_with_attrs("img", vec![("src", "a.png")]));
        assert!(!is_blank(&p));
        assert!(!is_blank(&Node::element("br")));
    }
}
