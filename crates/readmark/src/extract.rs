//! Main-content extraction.
//!
//! Strips boilerplate (navigation, headers, footers, scripts) from a full
//! HTML document and returns the inner HTML of the subtree most likely to
//! hold the readable content.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::html::scraper_to_node;

/// Boilerplate removed before looking for the main content
pub const REMOVAL_SELECTORS: &[&str] = &[
    "nav", "header", "footer", "aside",
    ".navigation", ".menu", ".sidebar", ".header", ".footer",
    ".nav", ".navbar", ".breadcrumb", ".pagination",
    "script", "style", "noscript",
];

/// Main-content candidates, highest priority first
pub const CANDIDATE_SELECTORS: &[&str] = &["main", ".main", ".content", ".post", "article", ".article"];

/// Where the extracted HTML came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Inner HTML of the first element matching this candidate selector
    Candidate(String),
    /// Inner HTML of the cleaned body
    Body,
    /// The input, returned unchanged
    Passthrough,
}

/// Result of an extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub html: String,
    pub source: Source,
    /// Number of boilerplate subtrees deleted
    pub removed: usize,
}

/// A parsed CSS selector together with its source text
#[derive(Debug, Clone)]
struct NamedSelector {
    text: String,
    selector: Selector,
}

/// Boilerplate stripper and main-content finder
#[derive(Debug, Clone)]
pub struct Extractor {
    removal: Vec<NamedSelector>,
    candidates: Vec<NamedSelector>,
}

impl Extractor {
    /// Build an extractor from CSS selector strings. Selectors that fail to
    /// parse are skipped with a warning.
    pub fn new(removal: &[&str], candidates: &[&str]) -> Self {
        Self {
            removal: parse_selectors(removal),
            candidates: parse_selectors(candidates),
        }
    }

    pub fn removal_selectors(&self) -> impl Iterator<Item = &str> {
        self.removal.iter().map(|s| s.text.as_str())
    }

    pub fn candidate_selectors(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|s| s.text.as_str())
    }

    /// Extract the main content, returning the input unchanged if anything
    /// goes wrong.
    pub fn extract(&self, raw_html: &str) -> String {
        match catch_unwind(AssertUnwindSafe(|| self.extract_document(raw_html))) {
            Ok(extraction) => extraction.html,
            Err(_) => {
                warn!("content extraction panicked, using the raw HTML");
                raw_html.to_string()
            }
        }
    }

    /// Extract the main content and report how it was chosen
    pub fn extract_document(&self, raw_html: &str) -> Extraction {
        // Plain text would only come back entity-encoded
        if !raw_html.contains('<') {
            return passthrough(raw_html, 0);
        }

        let mut document = Html::parse_document(raw_html);
        let removed = self.remove_boilerplate(&mut document);

        for candidate in &self.candidates {
            // Select from the root: detached subtrees stay in the arena
            if let Some(found) = document.root_element().select(&candidate.selector).next() {
                debug!(removed, candidate = %candidate.text, "main content found");
                return Extraction {
                    html: scraper_to_node(found, 0).inner_html(),
                    source: Source::Candidate(candidate.text.clone()),
                    removed,
                };
            }
        }

        let body = document
            .root_element()
            .children()
            .filter_map(scraper::ElementRef::wrap)
            .find(|e| e.value().name() == "body");
        match body {
            Some(body) => {
                debug!(removed, "no content candidate, using body");
                Extraction {
                    html: scraper_to_node(body, 0).inner_html(),
                    source: Source::Body,
                    removed,
                }
            }
            None => passthrough(raw_html, removed),
        }
    }

    /// Detach every element matching a removal selector. Returns the number
    /// of subtrees removed; matches inside a removed subtree are not counted.
    fn remove_boilerplate(&self, document: &mut Html) -> usize {
        // Collect before detaching, selection borrows the tree
        let matched: HashSet<_> = self
            .removal
            .iter()
            .flat_map(|s| document.root_element().select(&s.selector).map(|e| e.id()))
            .collect();

        let topmost: Vec<_> = matched
            .iter()
            .copied()
            .filter(|&id| {
                document
                    .tree
                    .get(id)
                    .is_some_and(|node| !node.ancestors().any(|a| matched.contains(&a.id())))
            })
            .collect();

        for &id in &topmost {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
        topmost.len()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(REMOVAL_SELECTORS, CANDIDATE_SELECTORS)
    }
}

fn passthrough(raw_html: &str, removed: usize) -> Extraction {
    debug!("nothing to extract, returning input unchanged");
    Extraction {
        html: raw_html.to_string(),
        source: Source::Passthrough,
        removed,
    }
}

fn parse_selectors(selectors: &[&str]) -> Vec<NamedSelector> {
    selectors
        .iter()
        .filter_map(|text| match Selector::parse(text) {
            Ok(selector) => Some(NamedSelector {
                text: text.to_string(),
                selector,
            }),
            Err(err) => {
                warn!(selector = %text, error = %err, "ignoring invalid selector");
                None
            }
        })
        .collect()
}
