//! Remote fetching through a content proxy.
//!
//! The network call itself belongs to the caller: a [`Fetcher`] is handed the
//! proxy request URL and returns the proxy's response body. This module builds
//! that URL and decodes the proxy's JSON envelope.

use serde::Deserialize;
use url::Url;

/// Proxy endpoint; the target URL goes in the `url` query parameter
pub const PROXY_ENDPOINT: &str = "https://api.allorigins.win/get";

/// Error type for fetch operations
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("invalid proxy payload: {0}")]
    InvalidPayload(String),

    #[error("proxy response has no contents")]
    MissingContents,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Message shown to the user in place of the Markdown
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::MissingContents => "Failed to fetch content from URL",
            _ => "Error fetching content from URL",
        }
    }
}

/// Performs the HTTP request for a proxy URL and returns the response body.
pub trait Fetcher {
    fn fetch(&self, request_url: &Url) -> Result<String, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&Url) -> Result<String, FetchError>,
{
    fn fetch(&self, request_url: &Url) -> Result<String, FetchError> {
        self(request_url)
    }
}

/// Build the proxy request URL for a target page. The target must be an
/// absolute `http` or `https` URL.
pub fn proxy_url(target: &str) -> Result<Url, FetchError> {
    let target = target.trim();
    let parsed = Url::parse(target).map_err(|e| FetchError::InvalidUrl(format!("{target}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "{target}: unsupported scheme {}",
            parsed.scheme()
        )));
    }

    Url::parse_with_params(PROXY_ENDPOINT, &[("url", target)])
        .map_err(|e| FetchError::InvalidUrl(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    contents: Option<String>,
    status: Option<ProxyStatus>,
}

#[derive(Debug, Deserialize)]
struct ProxyStatus {
    http_code: Option<u16>,
}

/// Decode the proxy's `{"contents": "...", "status": {...}}` envelope into
/// the fetched document.
pub fn decode_proxy_payload(body: &str) -> Result<String, FetchError> {
    let response: ProxyResponse =
        serde_json::from_str(body).map_err(|e| FetchError::InvalidPayload(e.to_string()))?;

    if let Some(code) = response.status.and_then(|s| s.http_code) {
        if !(200..300).contains(&code) {
            return Err(FetchError::Status(code));
        }
    }

    response
        .contents
        .filter(|contents| !contents.is_empty())
        .ok_or(FetchError::MissingContents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_url_encodes_target() {
        let url = proxy_url(" https://example.com/a?b=1&c=2 ").unwrap();
        assert_eq!(url.host_str(), Some("api.allorigins.win"));
        let target = url
            .query_pairs()
            .find(|(k, _)| k == "url")
            .map(|(_, v)| v.into_owned());
        assert_eq!(target.as_deref(), Some("https://example.com/a?b=1&c=2"));
    }

    #[test]
    fn test_proxy_url_rejects_bad_targets() {
        for target in ["example.com", "not a url", "ftp://example.com/file", "javascript:alert(1)"] {
            let err = proxy_url(target).unwrap_err();
            assert!(matches!(err, FetchError::InvalidUrl(_)), "{target}");
            assert_eq!(err.user_message(), "Error fetching content from URL");
        }
    }

    #[test]
    fn test_decode_contents() {
        let body = r#"{"contents":"<p>hi</p>","status":{"url":"x","http_code":200}}"#;
        assert_eq!(decode_proxy_payload(body).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_decode_non_json() {
        let err = decode_proxy_payload("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload(_)));
        assert_eq!(err.user_message(), "Error fetching content from URL");
    }

    #[test]
    fn test_decode_missing_contents() {
        for body in [r#"{"status":{}}"#, r#"{"contents":null}"#, r#"{"contents":""}"#] {
            let err = decode_proxy_payload(body).unwrap_err();
            assert!(matches!(err, FetchError::MissingContents), "{body}");
            assert_eq!(err.user_message(), "Failed to fetch content from URL");
        }
    }

    #[test]
    fn test_decode_error_status() {
        let body = r#"{"contents":"Not Found","status":{"http_code":404}}"#;
        assert!(matches!(decode_proxy_payload(body), Err(FetchError::Status(404))));
    }

    #[test]
    fn test_closure_fetcher() {
        let fetcher = |url: &Url| Ok::<_, FetchError>(url.to_string());
        let url = proxy_url("https://example.com").unwrap();
        assert!(fetcher.fetch(&url).unwrap().starts_with(PROXY_ENDPOINT));
    }
}
