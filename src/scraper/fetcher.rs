use crate::scraper::{FetchError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::Html;
use std::time::Duration;
use tracing::debug;

/// A fetched page: the URL that was requested and the raw markup.
///
/// The parsed tree is built on demand with [`Page::document`] so that the
/// (non-`Send`) document never has to live across an `.await`.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Parse the body into a traversable document
    #[must_use]
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Source of catalog pages and image bytes
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a page and return its markup
    async fn fetch_page(&self, url: &str) -> Result<Page>;

    /// GET a binary resource (poster images)
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP fetcher that presents itself as a desktop browser
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher sending `user_agent` on every request
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Network {
                url: String::new(),
                source,
            })?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!("GET {}", parsed);
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<Page> {
        let body = self
            .get(url)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        Ok(Page::new(url, body))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        Ok(bytes.to_vec())
    }
}
