//! HTTP fetcher implementation
//!
//! This module handles retrieval of the page under analysis:
//! - Building the shared HTTP client with the configured user agent and bounds
//! - GET requests that follow redirects and accept only a final 200

use crate::config::FetcherConfig;
use crate::FetchError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// The client-wide timeout bounds the primary page fetch; link probes
/// override it per request with their own shorter timeout.
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
/// use pagelens::config::FetcherConfig;
/// use pagelens::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.page_timeout())
        .connect_timeout(config.page_timeout().min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the raw document at `url`
///
/// Redirects are followed by the client. Anything other than a final
/// `200 OK` is a failure, as is a transport error or an unreadable body.
/// The response is consumed or dropped on every path, releasing the connection.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// * `Ok(String)` - The decoded document body
/// * `Err(FetchError)` - The fetch failed
pub async fn fetch_document(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        tracing::debug!("Fetch of {} returned {}", url, status);
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })
}
