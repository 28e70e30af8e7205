//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests to fetch page content
//! - Error classification (malformed URL, bad status, I/O or timeout)

use crate::config::FetcherConfig;
use crate::crawler::page::FetchedPage;
use crate::FetchError;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use url::Url;

/// Maximum redirect hops followed for a single page
const MAX_REDIRECTS: usize = 10;

/// Downloads pages for the pipeline
///
/// Implementations must be safe to call concurrently with different URLs and
/// must enforce their own timeouts; the pipeline does not add one.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use script_census::config::FetcherConfig;
/// use script_census::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP with a shared connection pool
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send {
        let client = self.client.clone();
        let url = url.to_string();
        async move { fetch_url(&client, &url).await }
    }
}

/// Fetches a URL and classifies any failure
///
/// | Condition | Result |
/// |-----------|--------|
/// | URL does not parse | `FetchError::MalformedUrl` |
/// | HTTP status outside 2xx | `FetchError::Status` |
/// | Connect or read timeout | `FetchError::Timeout` |
/// | Any other transport failure | `FetchError::Transport` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    tracing::info!("Download page: {}", url);

    let parsed = Url::parse(url).map_err(|source| FetchError::MalformedUrl {
        url: url.to_string(),
        source,
    })?;

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| classify_transport_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();

    let body = response
        .text()
        .await
        .map_err(|e| classify_transport_error(url, e))?;

    tracing::debug!("Downloaded {} bytes from {}", body.len(), final_url);

    Ok(FetchedPage {
        url: final_url,
        body,
    })
}

fn classify_transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchErrorKind;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetcherConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_url() {
        let fetcher = HttpFetcher::new(&FetcherConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::MalformedUrl);
        assert_eq!(err.url(), "not a url");
    }

    #[tokio::test]
    async fn test_connection_refused_is_io() {
        let fetcher = HttpFetcher::new(&FetcherConfig::default()).unwrap();
        // Port 9 (discard) is not listening on test hosts
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::Io);
    }

    // Status-code handling is covered with wiremock in the integration tests
}
