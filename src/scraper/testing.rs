//! In-memory [`PageFetcher`] for tests.

use crate::scraper::{FetchError, Page, PageFetcher, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned pages and bytes; anything unknown is a 404
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    bytes: HashMap<String, Vec<u8>>,
    page_calls: AtomicUsize,
    byte_calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    pub fn with_bytes(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.bytes.insert(url.into(), bytes);
        self
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn byte_calls(&self) -> usize {
        self.byte_calls.load(Ordering::SeqCst)
    }

    /// Total network round-trips
    pub fn calls(&self) -> usize {
        self.page_calls() + self.byte_calls()
    }

    /// Every requested URL in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_string());
    }
}

fn not_found(url: &str) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: 404,
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_page(&self, url: &str) -> Result<Page> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.record(url);
        let body = self.pages.get(url).ok_or_else(|| not_found(url))?;
        Ok(Page::new(url, body.clone()))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.byte_calls.fetch_add(1, Ordering::SeqCst);
        self.record(url);
        let bytes = self.bytes.get(url).ok_or_else(|| not_found(url))?;
        Ok(bytes.clone())
    }
}
