//! Page loading for discovery
//!
//! The crawler only needs the final URL and the HTML of each page, so loading
//! sits behind the narrow `PageLoader` trait. `HttpLoader` is the production
//! implementation; tests substitute in-memory fakes.

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A successfully loaded page
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// URL after redirects; relative links resolve against this
    pub final_url: Url,

    pub html: String,
}

/// Why a page could not be loaded
///
/// Always absorbed by the crawler: the page is skipped and discovery goes on.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("not an HTML page ({content_type})")]
    NotHtml { content_type: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Network(String),
}

/// Loads a URL and returns its HTML once the document content is available
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &Url) -> Result<LoadedPage, LoadError>;
}

#[async_trait]
impl<T: PageLoader + ?Sized> PageLoader for Arc<T> {
    async fn load(&self, url: &Url) -> Result<LoadedPage, LoadError> {
        (**self).load(url).await
    }
}

/// Builds the HTTP client used for discovery
///
/// # Arguments
///
/// * `config` - Crawler configuration supplying the user agent and timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site2pdf::config::CrawlerConfig;
/// use site2pdf::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.page_load_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed `PageLoader`
///
/// Follows redirects, rejects error statuses and non-HTML bodies. A missing
/// `Content-Type` header is treated as HTML.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: Client,
    timeout: Duration,
}

impl HttpLoader {
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            timeout: config.page_load_timeout(),
        })
    }

    fn classify(&self, e: reqwest::Error) -> LoadError {
        if e.is_timeout() {
            LoadError::Timeout(self.timeout)
        } else if e.is_connect() {
            LoadError::Network("Connection refused".to_string())
        } else {
            LoadError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl PageLoader for HttpLoader {
    async fn load(&self, url: &Url) -> Result<LoadedPage, LoadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(LoadError::NotHtml { content_type });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| self.classify(e))?;

        Ok(LoadedPage { final_url, html })
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.is_empty() || mime == "text/html" || mime == "application/xhtml+xml"
}
