//! Interactive conversion session.
//!
//! Holds the state behind a paste-or-fetch screen: the current input, the
//! Markdown shown to the user, the last error and whether a fetch is in
//! flight. Every fetch is tagged with a generation number so a slow response
//! can never overwrite newer content.

use std::path::{Path, PathBuf};

use readmark_preview::Line;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::converter::Converter;
use crate::export::{write_markdown, Clipboard, ExportError};
use crate::extract::Extractor;
use crate::fetch::{decode_proxy_payload, proxy_url, FetchError, Fetcher};

/// A fetch in flight, returned by [`Session::begin_fetch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub target: String,
    pub request_url: Url,
}

/// What [`Session::complete_fetch`] did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Extracted and converted content replaced the Markdown
    Applied,
    /// The fetch failed; an error message was set
    Failed,
    /// A newer input or fetch superseded this one
    Stale,
    /// The URL was blank, nothing was fetched
    Skipped,
}

pub struct Session {
    converter: Converter,
    extractor: Extractor,
    input: String,
    markdown: String,
    extracted_html: Option<String>,
    error: Option<String>,
    loading: bool,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::with_converter(Converter::standard())
    }

    pub fn with_converter(converter: Converter) -> Self {
        Self {
            converter,
            extractor: Extractor::default(),
            input: String::new(),
            markdown: String::new(),
            extracted_html: None,
            error: None,
            loading: false,
            generation: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Main-content HTML of the last successful fetch, kept until
    /// [`Session::clear`]
    pub fn extracted_html(&self) -> Option<&str> {
        self.extracted_html.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the input text. Anything that looks like HTML is converted,
    /// other text is shown as is.
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn set_input(&mut self, text: &str) {
        self.supersede();
        self.input = text.to_string();
        self.error = None;

        self.markdown = if text.trim().is_empty() {
            String::new()
        } else if text.contains('<') && text.contains('>') {
            self.converter.convert(text)
        } else {
            text.to_string()
        };
    }

    /// Start fetching `target`. Returns `None` for a blank URL.
    pub fn begin_fetch(&mut self, target: &str) -> Option<FetchTicket> {
        let target = target.trim();
        if target.is_empty() {
            return None;
        }

        self.supersede();
        self.error = None;

        let request_url = match proxy_url(target) {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "cannot build proxy URL");
                self.error = Some(err.user_message().to_string());
                return None;
            }
        };

        self.loading = true;
        debug!(generation = self.generation, %request_url, "fetch started");
        Some(FetchTicket {
            generation: self.generation,
            target: target.to_string(),
            request_url,
        })
    }

    /// Apply the proxy's response body for a ticket
    #[instrument(skip_all, fields(generation = ticket.generation))]
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        response: Result<String, FetchError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            debug!(current = self.generation, "ignoring stale fetch result");
            return FetchOutcome::Stale;
        }
        self.loading = false;

        match response.and_then(|body| decode_proxy_payload(&body)) {
            Ok(document) => {
                let content = self.extractor.extract(&document);
                self.markdown = self.converter.convert(&content);
                self.extracted_html = Some(content);
                self.error = None;
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!(error = %err, target = %ticket.target, "fetch failed");
                self.error = Some(err.user_message().to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Fetch and apply `target` in one call
    pub fn fetch_with<F: Fetcher>(&mut self, target: &str, fetcher: &F) -> FetchOutcome {
        let Some(ticket) = self.begin_fetch(target) else {
            return if target.trim().is_empty() {
                FetchOutcome::Skipped
            } else {
                FetchOutcome::Failed
            };
        };
        let response = fetcher.fetch(&ticket.request_url);
        self.complete_fetch(&ticket, response)
    }

    /// Reset to an empty session; pending fetches become stale.
    pub fn clear(&mut self) {
        self.supersede();
        self.input.clear();
        self.markdown.clear();
        self.extracted_html = None;
        self.error = None;
    }

    /// Copy the Markdown to a clipboard. Returns whether it succeeded.
    pub fn copy_markdown<C: Clipboard + ?Sized>(&self, clipboard: &mut C) -> bool {
        match clipboard.set_text(&self.markdown) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "copy to clipboard failed");
                false
            }
        }
    }

    /// Write the Markdown to `converted.md` in `dir`
    pub fn export_markdown(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        write_markdown(dir, &self.markdown).map_err(|err| {
            warn!(error = %err, "export failed");
            err
        })
    }

    /// Classify the Markdown line by line for display
    pub fn preview(&self) -> Vec<Line<'_>> {
        readmark_preview::render(&self.markdown)
    }

    fn supersede(&mut self) {
        self.generation += 1;
        self.loading = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
