//! Page fetching
//!
//! All network access of the crate goes through the [`Transport`] trait. The
//! [`SiteClient`] pairs a transport with the site origin, resolves relative
//! paths against it and parses fetched pages into HTML documents.

use scraper::Html;
use std::io::Read;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors that can occur while talking to the website
#[derive(Debug, Error)]
pub enum FetchError {
    /// A path or base URL could not be turned into an absolute URL
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// The request could not be completed
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} while fetching {url}")]
    Status { url: String, status: u16 },
}

/// A response body opened for streaming
pub struct RemoteBody {
    /// Size announced by the `Content-Length` header, if any
    pub content_length: Option<u64>,
    /// The body itself
    pub reader: Box<dyn Read>,
}

/// Blocking HTTP access used by the scraper and the downloader.
///
/// Implementors must report non-success status codes as
/// [`FetchError::Status`] rather than returning the error body.
pub trait Transport {
    /// Fetches a page and decodes its body as text
    fn get_text(&self, url: &Url) -> Result<String, FetchError>;

    /// Starts a streaming GET request
    fn open(&self, url: &Url) -> Result<RemoteBody, FetchError>;
}

/// [`Transport`] backed by a blocking reqwest client
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport with reqwest's default client settings
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    fn send(&self, url: &Url) -> Result<reqwest::blocking::Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        // reqwest decodes with the declared charset and falls back to UTF-8
        self.send(url)?.text().map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })
    }

    fn open(&self, url: &Url) -> Result<RemoteBody, FetchError> {
        let response = self.send(url)?;
        Ok(RemoteBody {
            content_length: response.content_length(),
            reader: Box::new(response),
        })
    }
}

/// Access to one website: a transport plus the origin every path is relative to
pub struct SiteClient {
    transport: Box<dyn Transport>,
    base_url: Url,
}

impl SiteClient {
    /// Creates a client for the given origin
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(transport: Box<dyn Transport>, base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            source: e,
        })?;
        Ok(Self {
            transport,
            base_url,
        })
    }

    /// Returns the origin paths are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a path (relative or absolute) against the origin
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url.join(path).map_err(|e| FetchError::InvalidUrl {
            url: path.to_string(),
            source: e,
        })
    }

    /// Fetches a page and parses it as HTML.
    ///
    /// Every call goes to the network; memoization is up to the caller.
    pub fn fetch(&self, path: &str) -> Result<Html, FetchError> {
        let url = self.resolve(path)?;
        debug!(%url, "fetching page");
        let body = self.transport.get_text(&url)?;
        Ok(Html::parse_document(&body))
    }

    /// Opens a streaming download for a path or absolute URL
    pub fn open(&self, path: &str) -> Result<RemoteBody, FetchError> {
        let url = self.resolve(path)?;
        debug!(%url, "opening download");
        self.transport.open(&url)
    }
}
