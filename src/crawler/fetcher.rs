//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building an HTTP client with the configured user agent
//! - Turning bare domain names into fetchable URLs
//! - GET requests bounded by a per-site timeout
//! - Error classification for failed fetches

use crate::config::UserAgentSettings;
use crate::crawler::parser::parse_page;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirects followed per site
const MAX_REDIRECTS: usize = 10;

/// Per-site fetch failure
///
/// These are only ever counted by the crawl; the detail is used for debug
/// logging and then dropped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

/// Metadata and raw body of a fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Final URL after redirects
    pub url: String,
    pub title: String,
    pub description: String,
    /// Language code as declared by the page
    pub language: String,
    pub body: Vec<u8>,
}

/// Fetches a site and returns its metadata and body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, uri: &str, timeout: Duration) -> Result<PageMetadata, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use rankcrawl::config::UserAgentSettings;
/// use rankcrawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentSettings::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentSettings,
    connect_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .connect_timeout(connect_timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Turns a stored domain (or full URL) into the URL to fetch
///
/// Bare domains such as `example.com` are fetched over plain HTTP at their
/// root; servers that only speak HTTPS are expected to redirect.
pub fn site_url(uri: &str) -> Result<Url, FetchError> {
    let uri = uri.trim();
    let candidate = if uri.contains("://") {
        uri.to_string()
    } else {
        format!("http://{}/", uri)
    };

    Url::parse(&candidate).map_err(|source| FetchError::InvalidUrl {
        url: uri.to_string(),
        source,
    })
}

/// [`PageFetcher`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, uri: &str, timeout: Duration) -> Result<PageMetadata, FetchError> {
        let url = site_url(uri)?;

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(uri, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: uri.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(uri, e))?
            .to_vec();

        let info = parse_page(&String::from_utf8_lossy(&body));

        Ok(PageMetadata {
            url: final_url,
            title: info.title.unwrap_or_default(),
            description: info.description.unwrap_or_default(),
            language: info.language.unwrap_or_default(),
            body,
        })
    }
}

fn classify_error(uri: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: uri.to_string(),
        }
    } else {
        FetchError::Http {
            url: uri.to_string(),
            source: error,
        }
    }
}
