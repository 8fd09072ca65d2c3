//! readmark-preview - line-local Markdown preview
//!
//! Classifies each line of a Markdown string by its leading token so a UI can
//! pick a display style for it: heading, bold, italic, code span, list
//! bullet, spacer or plain paragraph.
//!
//! This is not a Markdown parser. Every line is looked at on its own, so
//! fenced code blocks, nested lists and emphasis spanning lines are shown as
//! plain text.
//!
//! # Example
//!
//! ```rust
//! use readmark_preview::{render, Line};
//!
//! let lines = render("# Title\n\n- item");
//! assert_eq!(lines[0], Line::Heading { level: 1, text: "Title" });
//! assert_eq!(lines[1], Line::Blank);
//! assert_eq!(lines[2].to_string(), "• item");
//! ```

use std::fmt;

/// Display primitive for one line of Markdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `# `, `## ` or `### ` heading
    Heading { level: u8, text: &'a str },
    /// Whole line wrapped in `**`
    Bold(&'a str),
    /// Whole line wrapped in `*`
    Italic(&'a str),
    /// Whole line wrapped in backticks
    Code(&'a str),
    /// `- ` bullet
    ListItem(&'a str),
    Blank,
    Plain(&'a str),
}

impl<'a> Line<'a> {
    /// The line's text without its Markdown markers
    pub fn text(&self) -> &'a str {
        match *self {
            Line::Heading { text, .. } => text,
            Line::Bold(text)
            | Line::Italic(text)
            | Line::Code(text)
            | Line::ListItem(text)
            | Line::Plain(text) => text,
            Line::Blank => "",
        }
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::ListItem(text) => write!(f, "• {text}"),
            other => f.write_str(other.text()),
        }
    }
}

/// Classify a single line
pub fn classify(line: &str) -> Line<'_> {
    const HEADINGS: [(&str, u8); 3] = [("# ", 1), ("## ", 2), ("### ", 3)];

    for (marker, level) in HEADINGS {
        if let Some(text) = line.strip_prefix(marker) {
            return Line::Heading { level, text };
        }
    }

    if let Some(text) = wrapped(line, "**") {
        return Line::Bold(text);
    }
    if let Some(text) = wrapped(line, "*") {
        return Line::Italic(text);
    }
    if let Some(text) = wrapped(line, "`") {
        return Line::Code(text);
    }
    if let Some(text) = line.strip_prefix("- ") {
        return Line::ListItem(text);
    }

    if line.trim().is_empty() {
        Line::Blank
    } else {
        Line::Plain(line)
    }
}

/// Classify every line of a Markdown string. Lines are split on `\n` only,
/// so a trailing newline yields a final blank spacer.
pub fn render(markdown: &str) -> Vec<Line<'_>> {
    markdown.split('\n').map(classify).collect()
}

/// The text between a leading and trailing `marker`, which must not overlap
fn wrapped<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    if line.len() < marker.len() * 2 {
        return None;
    }
    line.strip_prefix(marker)?.strip_suffix(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        assert_eq!(classify("# Title"), Line::Heading { level: 1, text: "Title" });
        assert_eq!(classify("## Sub"), Line::Heading { level: 2, text: "Sub" });
        assert_eq!(classify("### Deep"), Line::Heading { level: 3, text: "Deep" });
        // Only three levels are styled
        assert_eq!(classify("#### Deeper"), Line::Plain("#### Deeper"));
        assert_eq!(classify("#hashtag"), Line::Plain("#hashtag"));
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(classify("**bold**"), Line::Bold("bold"));
        assert_eq!(classify("*italic*"), Line::Italic("italic"));
        assert_eq!(classify("**"), Line::Italic(""));
        assert_eq!(classify("*"), Line::Plain("*"));
        assert_eq!(classify("***"), Line::Italic("*"));
    }

    #[test]
    fn test_code_span() {
        assert_eq!(classify("`let x = 1;`"), Line::Code("let x = 1;"));
        assert_eq!(classify("`"), Line::Plain("`"));
    }

    #[test]
    fn test_list_items() {
        assert_eq!(classify("- item"), Line::ListItem("item"));
        assert_eq!(classify("---"), Line::Plain("---"));
        assert_eq!(classify("1. first"), Line::Plain("1. first"));
    }

    #[test]
    fn test_blank() {
        assert_eq!(classify(""), Line::Blank);
        assert_eq!(classify("   "), Line::Blank);
    }

    #[test]
    fn test_inline_markup_in_plain_line() {
        // Emphasis not covering the whole line is left as plain text
        assert_eq!(
            classify("some **bold** text"),
            Line::Plain("some **bold** text")
        );
    }

    #[test]
    fn test_render_is_line_local() {
        let lines = render("```\n# not a heading\n```");
        assert_eq!(lines[0], Line::Code("`"));
        assert_eq!(lines[1], Line::Heading { level: 1, text: "not a heading" });
    }

    #[test]
    fn test_render_keeps_trailing_blank_line() {
        assert_eq!(render("a\n"), vec![Line::Plain("a"), Line::Blank]);
        assert_eq!(render(""), vec![Line::Blank]);
        assert_eq!(render("# T\r\n"), vec![Line::Heading { level: 1, text: "T\r" }, Line::Blank]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Line::ListItem("a").to_string(), "• a");
        assert_eq!(Line::Heading { level: 2, text: "H" }.to_string(), "H");
        assert_eq!(Line::Blank.to_string(), "");
        assert_eq!(Line::Bold("b").text(), "b");
    }
}
