//! Torrent scrapers for various sites

pub mod catalog;
pub mod document;
pub mod record;
pub mod x1337;
pub mod yts;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, ScrapeError};

pub use catalog::{SiteCatalog, SiteUrls};
pub use document::Document;
pub use record::{FieldIssue, ScrapeResult, Total, TorrentRecord};
pub use x1337::X1337x;
pub use yts::Yts;

/// Browser identity sent with every request; several sites reject default
/// client user agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client with standard headers
pub fn create_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Anything that can turn a URL into page HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetcher backed by a shared `reqwest` client
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
    /// Fetch URL and return HTML
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "fetching");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}

/// Trending list to scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Daily,
    Weekly,
    Top100,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Daily => "daily",
            Section::Weekly => "weekly",
            Section::Top100 => "top-100",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Section::Daily),
            "weekly" => Ok(Section::Weekly),
            "top-100" => Ok(Section::Top100),
            _ => Err(ScrapeError::UnsupportedSection(s.to_string())),
        }
    }
}

impl serde::Serialize for Section {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// What a scrape call may use: where to fetch from and how wide to fan out
#[derive(Clone, Copy)]
pub struct ScrapeContext<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub concurrency: usize,
}

impl<'a> ScrapeContext<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }
}

/// A torrent site: how to address it and how to read its pages.
///
/// Adapters hold configuration only; everything produced by a request is
/// returned to the caller.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Key the site is registered under, e.g. `1337x`
    fn key(&self) -> &'static str;

    /// Static remark attached to search responses
    fn note(&self) -> Option<&'static str> {
        None
    }

    fn build_search_url(&self, query: &str, category: &str, page: u32) -> Result<String>;

    fn supports_trending(&self) -> bool {
        false
    }

    fn build_trending_url(&self, section: Section, _category: &str) -> Result<String> {
        Err(ScrapeError::UnsupportedSection(section.to_string()))
    }

    /// Absolute detail-page URLs found on a listing page, in page order
    fn parse_listing(&self, html: &str) -> Vec<String>;

    /// What is known about an item before its detail page is read
    fn listing_record(&self, url: &str) -> TorrentRecord {
        TorrentRecord::new(url)
    }

    /// Build the full record from a fetched detail page
    fn extract_detail(&self, url: &str, html: &str) -> TorrentRecord;

    fn supports_pagination(&self) -> bool {
        false
    }

    /// Page count as read from an already fetched first results page
    fn parse_total_pages(&self, _html: &str) -> Result<u64> {
        Err(ScrapeError::PaginationUnsupported { site: self.key() })
    }

    /// Number of result pages for a query
    async fn total_pages(&self, _ctx: ScrapeContext<'_>, _query: &str, _category: &str) -> Result<u64> {
        Err(ScrapeError::PaginationUnsupported { site: self.key() })
    }

    /// Number of torrents across the first `pages` result pages. Fetches each page.
    async fn torrent_count(&self, _ctx: ScrapeContext<'_>, _query: &str, _category: &str, _pages: u64) -> Result<u64> {
        Err(ScrapeError::PaginationUnsupported { site: self.key() })
    }
}

/// Fetch a listing page and enrich every item from its detail page.
///
/// A failing listing fetch fails the call. A failing detail fetch only
/// degrades that item to its listing record.
pub async fn scrape_listing(
    site: &dyn SiteAdapter,
    ctx: ScrapeContext<'_>,
    url: &str,
) -> Result<Vec<TorrentRecord>> {
    let html = ctx.fetcher.fetch(url).await?;
    debug!(site = site.key(), url, "fetched listing");
    Ok(enrich_listing(site, ctx, &html).await)
}

/// Enrich every item of an already fetched listing page, keeping page order
pub async fn enrich_listing(site: &dyn SiteAdapter, ctx: ScrapeContext<'_>, html: &str) -> Vec<TorrentRecord> {
    let urls = site.parse_listing(html);
    debug!(site = site.key(), items = urls.len(), "parsed listing");

    futures::stream::iter(urls)
        .map(|item| enrich(site, ctx, item))
        .buffered(ctx.concurrency)
        .collect::<Vec<_>>()
        .await
}

async fn enrich(site: &dyn SiteAdapter, ctx: ScrapeContext<'_>, url: String) -> TorrentRecord {
    let record = match ctx.fetcher.fetch(&url).await {
        Ok(html) => site.extract_detail(&url, &html),
        Err(e) => {
            warn!(site = site.key(), url = %url, error = %e, "detail page failed");
            let mut record = site.listing_record(&url);
            record.note("detail", e);
            record
        }
    };

    for issue in record.issues() {
        debug!(site = site.key(), url = %url, field = %issue.field, reason = %issue.reason, "field skipped");
    }
    record
}
