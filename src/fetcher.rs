use std::cell::Cell;
use std::time::Duration;

use scraper::Html;
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::{Result, ScrapeError};

const USER_AGENT: &str = concat!("cff_calendar/", env!("CARGO_PKG_VERSION"));

/// Source of raw page bytes.
pub trait PageSource {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Anything that can hand the extractors a parsed page.
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Html>;
}

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(HttpSource { client })
    }
}

impl PageSource for HttpSource {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Cache-first fetcher: serves pages from the [`CacheStore`] when present,
/// otherwise pulls them from `source` and writes them back.
pub struct CachingFetcher<S> {
    source: S,
    cache: CacheStore,
    read_cache: bool,
    hits: Cell<usize>,
    fetches: Cell<usize>,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStats {
    pub cache_hits: usize,
    pub network_fetches: usize,
}

impl<S: PageSource> CachingFetcher<S> {
    pub fn new(source: S, cache: CacheStore) -> Self {
        CachingFetcher {
            source,
            cache,
            read_cache: true,
            hits: Cell::new(0),
            fetches: Cell::new(0),
        }
    }

    /// Skip cache reads; fetched pages are still written.
    pub fn refresh(mut self) -> Self {
        self.read_cache = false;
        self
    }

    pub fn stats(&self) -> FetchStats {
        FetchStats {
            cache_hits: self.hits.get(),
            network_fetches: self.fetches.get(),
        }
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if self.read_cache {
            if let Some(bytes) = self.cache.get(url)? {
                debug!("cache hit: {}", url);
                self.hits.set(self.hits.get() + 1);
                return Ok(bytes);
            }
        }

        debug!("fetching: {}", url);
        let bytes = self.source.get(url).await?;
        self.fetches.set(self.fetches.get() + 1);
        self.cache.put(url, &bytes)?;
        Ok(bytes)
    }
}

impl<S: PageSource> Fetcher for CachingFetcher<S> {
    async fn fetch(&self, url: &str) -> Result<Html> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(Html::parse_document(&String::from_utf8_lossy(&bytes)))
    }
}

/// In-memory pages keyed by URL; bypasses network and cache in tests.
#[cfg(test)]
pub struct StaticPages {
    pages: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl StaticPages {
    pub fn new() -> Self {
        StaticPages {
            pages: std::collections::HashMap::new(),
        }
    }

    pub fn with(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn fixture(self, url: &str, name: &str) -> Self {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap();
        self.with(url, html)
    }
}

#[cfg(test)]
impl Fetcher for StaticPages {
    async fn fetch(&self, url: &str) -> Result<Html> {
        match self.pages.get(url) {
            Some(html) => Ok(Html::parse_document(html)),
            None => Err(ScrapeError::Fetch {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
