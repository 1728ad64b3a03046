use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use librarian_common::LibrarianError;

use crate::traits::PageFetcher;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("librarian/", env!("CARGO_PKG_VERSION"));

/// Plain HTTP GET fetcher. No JavaScript rendering.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

/// Reject anything that is not an absolute http(s) URL.
pub fn check_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url).context("Invalid URL")?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        bail!("Only http/https URLs are allowed, got: {}", parsed.scheme());
    }
    Ok(parsed)
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = check_url(url)?;

        let resp = self
            .client
            .get(parsed)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LibrarianError::Fetch(format!("HTTP {status} fetching {url}")).into());
        }

        let body = resp.text().await.context("Failed to read response body")?;
        debug!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_and_https_are_allowed() {
        assert!(check_url("http://example.com/a").is_ok());
        assert!(check_url("https://example.com/a").is_ok());
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(check_url("file:///etc/passwd").is_err());
        assert!(check_url("ftp://example.com").is_err());
        assert!(check_url("not a url").is_err());
    }
}
