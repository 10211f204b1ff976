//! Search and trending entry points
//!
//! Resolves the site, drives fetch -> parse -> enrich, and shapes the result
//! into the response envelopes served by the API.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, ScrapeError};
use crate::scrapers::{
    enrich_listing, scrape_listing, PageFetcher, ScrapeContext, ScrapeResult, Section, SiteAdapter, SiteCatalog,
    Total, TorrentRecord,
};

/// Default number of detail pages fetched at once
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub site: String,
    pub query: String,
    pub category: String,
    pub page: u32,
}

impl SearchRequest {
    /// Search for `query` on `site`, all categories, first page
    pub fn new(site: &str, query: &str) -> Self {
        Self {
            site: site.to_lowercase(),
            query: query.to_string(),
            category: "all".to_string(),
            page: 1,
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_lowercase();
        self
    }

    /// Page number; values below 1 are raised to 1
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingRequest {
    pub site: String,
    pub section: Section,
    pub category: String,
}

impl TrendingRequest {
    pub fn new(site: &str) -> Self {
        Self {
            site: site.to_lowercase(),
            section: Section::default(),
            category: "all".to_string(),
        }
    }

    pub fn section(mut self, section: Section) -> Self {
        self.section = section;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_lowercase();
        self
    }
}

/// Knobs for a search call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Count every torrent across all result pages. This fetches each page
    /// of the result set and is by far the slowest part of a search.
    pub count_torrents: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Body of a search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub data: Vec<TorrentRecord>,
    pub status: Status,
    #[serde(rename = "current page")]
    pub current_page: u32,
    #[serde(rename = "total pages")]
    pub total_pages: Total,
    #[serde(rename = "showing result")]
    pub showing_result: usize,
    #[serde(rename = "total torrents")]
    pub total_torrents: Total,
    #[serde(rename = "scrapped url")]
    pub scraped_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of a trending response
#[derive(Debug, Clone, Serialize)]
pub struct TrendingResponse {
    pub data: Vec<TorrentRecord>,
    pub status: Status,
    #[serde(rename = "showing result")]
    pub showing_result: usize,
    #[serde(rename = "total torrents")]
    pub total_torrents: usize,
    pub section: Section,
    pub category: String,
    #[serde(rename = "scrapped url")]
    pub scraped_url: String,
}

/// Runs search and trending requests against the site catalog
#[derive(Clone)]
pub struct Orchestrator {
    catalog: Arc<SiteCatalog>,
    fetcher: Arc<dyn PageFetcher>,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(catalog: SiteCatalog, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn catalog(&self) -> &SiteCatalog {
        &self.catalog
    }

    fn context(&self) -> ScrapeContext<'_> {
        ScrapeContext::new(self.fetcher.as_ref(), self.concurrency)
    }

    /// Scrape one page of search results, plus totals where the site has them
    pub async fn scrape_search(&self, site: &dyn SiteAdapter, req: &SearchRequest, opts: SearchOptions) -> Result<ScrapeResult> {
        let url = match site.build_search_url(&req.query, &req.category, req.page) {
            Ok(url) => url,
            Err(ScrapeError::UnsupportedCategory(category)) => {
                info!(site = site.key(), category = %category, "category not offered; empty result");
                return Ok(ScrapeResult::empty());
            }
            Err(e) => return Err(e),
        };

        let ctx = self.context();
        let html = ctx.fetcher.fetch(&url).await?;
        let torrents = enrich_listing(site, ctx, &html).await;

        let mut warning = None;
        let (total_pages, total_torrents) = if site.supports_pagination() {
            // Totals always come from page 1, which is the listing itself here
            let pages = if req.page == 1 {
                site.parse_total_pages(&html)
            } else {
                site.total_pages(ctx, &req.query, &req.category).await
            };

            match pages {
                Ok(pages) => {
                    let count = if opts.count_torrents {
                        Total::Known(site.torrent_count(ctx, &req.query, &req.category, pages).await?)
                    } else {
                        Total::Unknown
                    };
                    (Total::Known(pages), count)
                }
                Err(e @ ScrapeError::PageNumber(_)) => {
                    warn!(site = site.key(), url = %url, error = %e, "pagination unreadable; totals unknown");
                    warning = Some(format!("malformed pagination: {}", e));
                    (Total::Unknown, Total::Unknown)
                }
                Err(e) => return Err(e),
            }
        } else {
            (Total::Unknown, Total::Unknown)
        };

        Ok(ScrapeResult {
            torrents,
            scraped_url: url,
            total_pages,
            total_torrents,
            warning,
        })
    }

    pub async fn search(&self, req: &SearchRequest, opts: SearchOptions) -> Result<SearchResponse> {
        let site = self.catalog.get(&req.site)?;
        let result = self.scrape_search(site.as_ref(), req, opts).await?;
        info!(
            site = site.key(),
            query = %req.query,
            page = req.page,
            results = result.torrents.len(),
            "search done"
        );

        let (status, error) = if req.page > 1 && result.torrents.is_empty() {
            let message = match result.total_pages {
                Total::Known(n) => format!("only {} page(s) available", n),
                Total::Unknown => format!("no results on page {}", req.page),
            };
            (Status::Error, Some(message))
        } else if let Some(warning) = result.warning {
            (Status::Error, Some(warning))
        } else {
            (Status::Success, None)
        };

        Ok(SearchResponse {
            showing_result: result.torrents.len(),
            data: result.torrents,
            status,
            current_page: req.page,
            total_pages: result.total_pages,
            total_torrents: result.total_torrents,
            scraped_url: result.scraped_url,
            note: site.note().map(String::from),
            error,
        })
    }

    pub async fn trending(&self, req: &TrendingRequest) -> Result<TrendingResponse> {
        let site = self.catalog.get(&req.site)?;
        if !site.supports_trending() {
            return Err(ScrapeError::UnsupportedSite(req.site.clone()));
        }

        let (torrents, scraped_url) = match site.build_trending_url(req.section, &req.category) {
            Ok(url) => (scrape_listing(site.as_ref(), self.context(), &url).await?, url),
            Err(ScrapeError::UnsupportedCategory(category)) => {
                info!(site = site.key(), category = %category, "category not offered; empty result");
                (Vec::new(), String::new())
            }
            Err(e) => return Err(e),
        };
        info!(site = site.key(), section = %req.section, results = torrents.len(), "trending done");

        Ok(TrendingResponse {
            showing_result: torrents.len(),
            total_torrents: torrents.len(),
            data: torrents,
            status: Status::Success,
            section: req.section,
            category: req.category.clone(),
            scraped_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages and remembers what was asked for; anything else is a 404
    struct Pages {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl Pages {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages.iter().map(|(u, h)| (u.to_string(), h.to_string())).collect(),
                requested: Mutex::new(Vec::new()),
            })
        }

        fn hits(&self, url: &str) -> usize {
            self.requested.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl PageFetcher for Pages {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn orchestrator(pages: &[(&str, &str)]) -> Orchestrator {
        Orchestrator::new(SiteCatalog::default(), Pages::new(pages))
    }

    const ONE_ROW: &str = r#"<table><tbody>
        <tr><td><a href="/torrent/1/Only-One/">a</a></td></tr>
    </tbody></table>"#;

    #[test]
    fn requests_normalize_input() {
        let req = SearchRequest::new("1337X", "Dune").category("Movies").page(0);
        assert_eq!(req.site, "1337x");
        assert_eq!(req.query, "Dune");
        assert_eq!(req.category, "movies");
        assert_eq!(req.page, 1);

        let trending = TrendingRequest::new("1337x");
        assert_eq!(trending.section, Section::Daily);
        assert_eq!(trending.category, "all");
    }

    #[tokio::test]
    async fn unknown_site_is_an_error_not_a_panic() {
        let o = orchestrator(&[]);
        let err = o
            .search(&SearchRequest::new("unknowncrawler", "x"), SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::UnsupportedSite(s) if s == "unknowncrawler"));

        let err = o.trending(&TrendingRequest::new("rarbg")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::UnsupportedSite(_)));
    }

    #[tokio::test]
    async fn unsupported_category_is_empty_success() {
        let o = orchestrator(&[]);
        let resp = o
            .search(&SearchRequest::new("1337x", "x").category("ebooks"), SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.status, Status::Success);
        assert!(resp.data.is_empty());
        assert_eq!(resp.total_pages, Total::Known(0));
        assert_eq!(resp.scraped_url, "");

        let resp = o
            .trending(&TrendingRequest::new("1337x").category("ebooks"))
            .await
            .unwrap();
        assert_eq!(resp.status, Status::Success);
        assert!(resp.data.is_empty());
    }

    #[tokio::test]
    async fn listing_failure_fails_the_request() {
        let o = orchestrator(&[]);
        let err = o
            .search(&SearchRequest::new("yts", "matrix"), SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn broken_detail_page_keeps_the_item() {
        let listing = r#"<table><tbody>
            <tr><td><a href="/torrent/1/Good-One/">a</a></td></tr>
            <tr><td><a href="/torrent/2/Broken-One/">b</a></td></tr>
        </tbody></table>"#;
        let detail = r#"<a href="magnet:?xt=urn:btih:1">m</a>"#;
        let o = orchestrator(&[
            ("https://1337x.to/trending", listing),
            ("https://1337x.to/torrent/1/Good-One/", detail),
        ]);

        let resp = o.trending(&TrendingRequest::new("1337x")).await.unwrap();
        assert_eq!(resp.showing_result, 2);
        assert_eq!(resp.scraped_url, "https://1337x.to/trending");
        assert_eq!(resp.data[0].get_str("magnet"), Some("magnet:?xt=urn:btih:1"));
        assert_eq!(resp.data[1].url(), "https://1337x.to/torrent/2/Broken-One/");
        assert_eq!(resp.data[1].get_str("title"), Some("Broken One"));
        assert!(resp.data[1].has_issue("detail"));
    }

    #[tokio::test]
    async fn unreadable_pagination_keeps_records_with_unknown_totals() {
        let listing = format!(
            r#"{}<div class="pagination"><ul><li class="last"><a href="/search/matrix/last/">Last</a></li></ul></div>"#,
            ONE_ROW
        );
        let o = orchestrator(&[
            ("https://1337x.to/search/matrix/1/", listing.as_str()),
            ("https://1337x.to/torrent/1/Only-One/", r#"<a href="magnet:?xt=urn:btih:1">m</a>"#),
        ]);

        let resp = o
            .search(&SearchRequest::new("1337x", "matrix"), SearchOptions { count_torrents: true })
            .await
            .unwrap();
        assert_eq!(resp.status, Status::Error);
        assert_eq!(resp.showing_result, 1);
        assert_eq!(resp.data[0].get_str("magnet"), Some("magnet:?xt=urn:btih:1"));
        assert_eq!(resp.total_pages, Total::Unknown);
        assert_eq!(resp.total_torrents, Total::Unknown);
        let error = resp.error.unwrap();
        assert!(error.starts_with("malformed pagination"), "{error}");
        assert!(error.contains("/search/matrix/last/"), "{error}");
    }

    #[tokio::test]
    async fn first_page_search_reuses_the_listing_for_totals() {
        let pages = Pages::new(&[
            ("https://1337x.to/search/matrix/1/", ONE_ROW),
            ("https://1337x.to/torrent/1/Only-One/", "<p></p>"),
        ]);
        let o = Orchestrator::new(SiteCatalog::default(), pages.clone());

        let resp = o
            .search(&SearchRequest::new("1337x", "matrix"), SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.total_pages, Total::Known(1));
        assert_eq!(pages.hits("https://1337x.to/search/matrix/1/"), 1);

        let resp = o
            .search(&SearchRequest::new("1337x", "matrix"), SearchOptions { count_torrents: true })
            .await
            .unwrap();
        assert_eq!(resp.total_torrents, Total::Known(1));
        // listing plus the one counted page
        assert_eq!(pages.hits("https://1337x.to/search/matrix/1/"), 3);
    }

    #[test]
    fn search_response_uses_api_field_names() {
        let resp = SearchResponse {
            data: vec![TorrentRecord::new("https://x/t/1/")],
            status: Status::Error,
            current_page: 2,
            total_pages: Total::Known(1),
            showing_result: 1,
            total_torrents: Total::Unknown,
            scraped_url: "https://x/search/q/2/".to_string(),
            note: None,
            error: Some("only 1 page(s) available".to_string()),
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["current page"], 2);
        assert_eq!(value["total pages"], 1);
        assert_eq!(value["total torrents"], "unknown");
        assert_eq!(value["scrapped url"], "https://x/search/q/2/");
        assert_eq!(value["data"][0]["url"], "https://x/t/1/");
        assert!(value.get("note").is_none());
    }
}
