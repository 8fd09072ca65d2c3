//! Configuration options for Markdown conversion

use std::str::FromStr;

use serde::Deserialize;

use crate::ConvertError;

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Use indented code blocks (4 spaces)
    Indented,
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
}

impl FromStr for HeadingStyle {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "atx" => Ok(HeadingStyle::Atx),
            "setext" => Ok(HeadingStyle::Setext),
            other => Err(ConvertError::InvalidOption(format!(
                "unknown heading style: {other}"
            ))),
        }
    }
}

impl FromStr for CodeBlockStyle {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fenced" => Ok(CodeBlockStyle::Fenced),
            "indented" => Ok(CodeBlockStyle::Indented),
            other => Err(ConvertError::InvalidOption(format!(
                "unknown code block style: {other}"
            ))),
        }
    }
}

/// Options for Markdown conversion.
///
/// Deserialises from the camelCase object form used by turndown, e.g.
/// `{"headingStyle": "atx", "codeBlockStyle": "fenced"}`; missing keys keep
/// their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Emitted before the newline of a `<br>`
    pub br: String,
}

impl Options {
    /// Parse options from a JSON object
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| ConvertError::InvalidOption(e.to_string()))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "---".to_string(),
            bullet_list_marker: '-',
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: '*',
            strong_delimiter: "**".to_string(),
            br: String::new(),
        }
    }
}
