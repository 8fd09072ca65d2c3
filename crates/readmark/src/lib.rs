//! # readmark
//!
//! Turn web pages into readable Markdown.
//!
//! The pipeline has two stages:
//!
//! - **Extraction** ([`Extractor`]): strip navigation, headers, footers and
//!   scripts from a full HTML document and keep the subtree most likely to be
//!   the main content.
//! - **Conversion** ([`Converter`]): walk the remaining HTML and apply a table
//!   of rules, in the manner of [turndown](https://github.com/mixmark-io/turndown),
//!   to produce Markdown.
//!
//! [`Session`] ties both to user input, URL fetching and export.
//!
//! ## Example
//!
//! ```rust
//! let page = r#"<html><body>
//!     <nav><a href="/">Home</a></nav>
//!     <article><h1>Hello</h1><p>This is <strong>bold</strong>.</p></article>
//! </body></html>"#;
//!
//! let markdown = readmark::convert(&readmark::extract(page));
//! assert_eq!(markdown, "# Hello\n\nThis is **bold**.");
//! ```
//!
//! ## Custom rules
//!
//! ```rust
//! use readmark::{Converter, Rule};
//!
//! let mut converter = Converter::new();
//! converter.add_rule("mark", Rule::for_tag("mark", |_, content, _| format!("=={content}==")));
//!
//! assert_eq!(converter.convert("<p>a <mark>b</mark></p>"), "a ==b==");
//! ```

pub mod converter;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod html;
pub mod node;
pub mod options;
pub mod rules;
pub mod session;
mod utilities;

use once_cell::sync::Lazy;
use tracing::instrument;

pub use converter::{Converter, ERROR_SENTINEL, MAX_DEPTH};
pub use export::{write_markdown, Clipboard, ClipboardError, ExportError};
pub use extract::{Extraction, Extractor, Source};
pub use fetch::{FetchError, Fetcher};
pub use html::{parse_document, parse_html};
pub use node::{Node, NodeRef, NodeType};
pub use options::{CodeBlockStyle, HeadingStyle, Options};
pub use rules::{Filter, Rule, Rules};
pub use session::{FetchOutcome, FetchTicket, Session};
pub use utilities::escape_markdown;

/// Error type for conversion operations
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("nesting deeper than {0} elements")]
    TooDeep(usize),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

static STANDARD: Lazy<Converter> = Lazy::new(Converter::standard);

/// Extract the main content of a page with the default selectors.
///
/// Never fails; on any problem the input is returned unchanged.
#[instrument(skip_all, fields(len = raw_html.len()))]
pub fn extract(raw_html: &str) -> String {
    Extractor::default().extract(raw_html)
}

/// Convert HTML to Markdown with [`Converter::standard`].
///
/// Returns [`ERROR_SENTINEL`] if the conversion fails.
pub fn convert(html: &str) -> String {
    STANDARD.convert(html)
}
