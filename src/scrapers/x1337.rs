//! 1337x scraper
//!
//! Listing pages only carry links; every item is enriched from its detail
//! page. Result pages are numbered in the URL path, which is what pagination
//! discovery and torrent counting rely on.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use super::document::{absolutize, element_attr, element_text, scoped, Document};
use super::{ScrapeContext, Section, SiteAdapter, TorrentRecord};
use crate::error::{Result, ScrapeError};

pub const BASE_URL: &str = "https://1337x.to";

/// Categories the site can filter on
pub const CATEGORIES: &[&str] = &[
    "movies",
    "tv",
    "games",
    "apps",
    "music",
    "documentaries",
    "anime",
    "other",
    "xxx",
    "all",
];

const ROW: &str = "tbody tr";
const POSTER: &str = ".torrent-image img";
const SCREENSHOT: &str = ".descrimg";
const HASH: &str = ".infohash-box p span";
const MAGNET: &str = "a[href^='magnet:']";
const LAST_PAGE: &str = ".last a";

static PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)/?$").expect("hardcoded regex pattern is valid"));

#[derive(Debug, Clone)]
pub struct X1337x {
    base_url: String,
}

impl X1337x {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn check_category(category: &str) -> Result<()> {
        if CATEGORIES.contains(&category) {
            Ok(())
        } else {
            Err(ScrapeError::UnsupportedCategory(category.to_string()))
        }
    }

    /// Fetch `1..=pages` and sum their row counts
    async fn count_rows(&self, ctx: ScrapeContext<'_>, query: &str, category: &str, pages: u64) -> Result<u64> {
        let urls = (1..=pages)
            .map(|page| {
                let page = u32::try_from(page).map_err(|_| ScrapeError::PageNumber(page.to_string()))?;
                self.build_search_url(query, category, page)
            })
            .collect::<Result<Vec<_>>>()?;

        futures::stream::iter(urls)
            .map(|url| async move {
                let html = ctx.fetcher.fetch(&url).await?;
                let rows = count_listing_rows(&html);
                debug!(url = %url, rows, "counted page");
                Ok::<u64, ScrapeError>(rows)
            })
            .buffer_unordered(ctx.concurrency)
            .try_fold(0, |total, rows| async move { Ok(total + rows) })
            .await
    }
}

impl Default for X1337x {
    fn default() -> Self {
        Self::new(BASE_URL)
    }
}

#[async_trait]
impl SiteAdapter for X1337x {
    fn key(&self) -> &'static str {
        "1337x"
    }

    fn build_search_url(&self, query: &str, category: &str, page: u32) -> Result<String> {
        let encoded = urlencoding::encode(query);
        let category = category.to_lowercase();
        Self::check_category(&category)?;

        let url = match category.as_str() {
            "all" => format!("{}/search/{}/{}/", self.base_url, encoded, page),
            "tv" | "xxx" => format!(
                "{}/category-search/{}/{}/{}/",
                self.base_url,
                encoded,
                category.to_uppercase(),
                page
            ),
            other => format!(
                "{}/category-search/{}/{}/{}/",
                self.base_url,
                encoded,
                capitalize(other),
                page
            ),
        };
        Ok(url)
    }

    fn supports_trending(&self) -> bool {
        true
    }

    fn build_trending_url(&self, section: Section, category: &str) -> Result<String> {
        let category = category.to_lowercase();
        Self::check_category(&category)?;

        let url = match (section, category.as_str()) {
            (Section::Daily, "all") => format!("{}/trending", self.base_url),
            (Section::Weekly, "all") => format!("{}/trending-week", self.base_url),
            (Section::Daily, cat) => format!("{}/trending/d/{}/", self.base_url, cat),
            (Section::Weekly, cat) => format!("{}/trending/w/{}/", self.base_url, cat),
            (Section::Top100, "all") => format!("{}/top-100", self.base_url),
            (Section::Top100, cat) => format!("{}/top-100-{}", self.base_url, cat),
        };
        Ok(url)
    }

    fn parse_listing(&self, html: &str) -> Vec<String> {
        let doc = Document::parse(html);
        let mut urls = Vec::new();

        for row in doc.select(ROW) {
            let href = scoped(&row, "td a")
                .iter()
                .filter_map(|a| element_attr(a, "href"))
                .find(|href| href.contains("torrent"));

            // Only site-relative links point at detail pages
            if let Some(href) = href.filter(|h| h.starts_with('/') && !h.starts_with("//")) {
                urls.push(absolutize(&self.base_url, &href));
            }
        }

        urls
    }

    fn listing_record(&self, url: &str) -> TorrentRecord {
        let mut record = TorrentRecord::new(url);
        match title_from_url(url) {
            Some(title) => record.set("title", title),
            None => record.note("title", format!("no path segment in {}", url)),
        }
        record
    }

    fn extract_detail(&self, url: &str, html: &str) -> TorrentRecord {
        let doc = Document::parse(html);
        let mut record = self.listing_record(url);

        let info = info_fields(&doc);
        if info.is_empty() {
            record.note("information", ScrapeError::missing(".list li"));
        }
        for (key, value) in info {
            record.set(key, value);
        }

        record.set_or_note("hash", doc.text(HASH).ok_or_else(|| ScrapeError::missing(HASH)));
        record.set_or_note("magnet", doc.attr(MAGNET, "href").ok_or_else(|| ScrapeError::missing(MAGNET)));
        record.set_or_note(
            "poster",
            doc.attr(POSTER, "src")
                .map(|src| absolutize(&self.base_url, &src))
                .ok_or_else(|| ScrapeError::missing(POSTER)),
        );

        let screenshots: Vec<String> = doc
            .select(SCREENSHOT)
            .iter()
            .filter_map(|img| element_attr(img, "data-original"))
            .map(|src| full_size(&src))
            .collect();
        if screenshots.is_empty() {
            record.note("screenshots", ScrapeError::missing(SCREENSHOT));
        } else {
            record.set("screenshots", screenshots);
        }

        record
    }

    fn supports_pagination(&self) -> bool {
        true
    }

    fn parse_total_pages(&self, html: &str) -> Result<u64> {
        parse_total_pages(html)
    }

    async fn total_pages(&self, ctx: ScrapeContext<'_>, query: &str, category: &str) -> Result<u64> {
        let url = self.build_search_url(query, category, 1)?;
        let html = ctx.fetcher.fetch(&url).await?;
        parse_total_pages(&html)
    }

    async fn torrent_count(&self, ctx: ScrapeContext<'_>, query: &str, category: &str, pages: u64) -> Result<u64> {
        self.count_rows(ctx, query, category, pages).await
    }
}

/// Rows on one listing page
pub fn count_listing_rows(html: &str) -> u64 {
    Document::parse(html).count(ROW) as u64
}

/// Read the page count from the pagination control of a results page.
///
/// The "last" link wins. Without it (short result sets) the highest numbered
/// page link is used; a page with no pagination is the only page.
pub fn parse_total_pages(html: &str) -> Result<u64> {
    let doc = Document::parse(html);

    if let Some(href) = doc.attr(LAST_PAGE, "href") {
        return page_number(&href).ok_or(ScrapeError::PageNumber(href));
    }

    let highest = doc
        .select(".pagination a")
        .iter()
        .filter_map(|a| element_attr(a, "href"))
        .filter_map(|href| page_number(&href))
        .max();

    Ok(match highest {
        Some(n) => n,
        None if doc.count(ROW) > 0 => 1,
        None => 0,
    })
}

/// Trailing numeric path segment, e.g. `/search/matrix/7/` -> 7
fn page_number(href: &str) -> Option<u64> {
    PAGE_NUMBER.captures(href)?.get(1)?.as_str().parse().ok()
}

/// Title from the slug of a detail URL: `/torrent/1/Some-Name/` -> "Some Name"
fn title_from_url(url: &str) -> Option<String> {
    url.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|slug| !slug.is_empty())
        .map(|slug| slug.replace('-', " "))
}

/// Key/value pairs from the two information lists of a detail page
fn info_fields(doc: &Document) -> Map<String, Value> {
    let mut fields = Map::new();
    for index in [1, 2] {
        let Some(list) = doc.nth(".list", index) else {
            continue;
        };
        for item in scoped(&list, "li") {
            let key = scoped(&item, "strong").first().map(element_text).unwrap_or_default();
            let value = scoped(&item, "span").first().map(element_text).unwrap_or_default();
            if !key.is_empty() && !value.is_empty() {
                fields.insert(key, Value::String(value));
            }
        }
    }
    fields
}

/// Gallery links point at thumbnails (`name.th.jpg`); the full image is
/// the same file without the `.th` before its extension
fn full_size(src: &str) -> String {
    match src.rsplit_once('/') {
        Some((dir, file)) => format!("{}/{}", dir, strip_thumb(file)),
        None => strip_thumb(src),
    }
}

fn strip_thumb(file: &str) -> String {
    match file.rsplit_once('.') {
        Some((stem, ext)) => match stem.strip_suffix(".th") {
            Some(stem) => format!("{}.{}", stem, ext),
            None => file.to_string(),
        },
        None => file.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
