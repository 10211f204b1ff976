//! YTS scraper
//!
//! Movies only. Each movie page carries everything, including one download
//! per quality, so a detail fetch is the whole enrichment.

use async_trait::async_trait;
use serde::Serialize;

use super::document::{absolutize, element_attr, element_text, scoped, Document};
use super::{Section, SiteAdapter, TorrentRecord};
use crate::error::{Result, ScrapeError};

pub const BASE_URL: &str = "https://yts.mx";

const CARD: &str = ".browse-movie-wrap";
const POSTER: &str = "#movie-poster img";
const TECH_SPEC: &str = ".tech-spec-element";
/// Position of the runtime among the unlabeled tech spec entries
const RUNTIME_INDEX: usize = 6;

/// One downloadable quality of a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityTorrent {
    pub quality: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnet_link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Yts {
    base_url: String,
}

impl Yts {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for Yts {
    fn default() -> Self {
        Self::new(BASE_URL)
    }
}

#[async_trait]
impl SiteAdapter for Yts {
    fn key(&self) -> &'static str {
        "yts"
    }

    fn note(&self) -> Option<&'static str> {
        Some("yts only has movies category")
    }

    /// Genre, quality and rating filters stay at `all`
    fn build_search_url(&self, query: &str, _category: &str, page: u32) -> Result<String> {
        let encoded = urlencoding::encode(query);
        let url = if page > 1 {
            format!(
                "{}/browse-movies/{}/all/all/0/latest/0/all?page={}",
                self.base_url, encoded, page
            )
        } else {
            format!("{}/browse-movies/{}/all/all/0/latest/0/all", self.base_url, encoded)
        };
        Ok(url)
    }

    fn supports_trending(&self) -> bool {
        true
    }

    /// The site has a single trending list
    fn build_trending_url(&self, _section: Section, _category: &str) -> Result<String> {
        Ok(format!("{}/trending-movies", self.base_url))
    }

    fn parse_listing(&self, html: &str) -> Vec<String> {
        let doc = Document::parse(html);
        doc.select(CARD)
            .iter()
            .filter_map(|card| scoped(card, "a").first().and_then(|a| element_attr(a, "href")))
            .map(|href| absolutize(&self.base_url, &href))
            .collect()
    }

    fn extract_detail(&self, url: &str, html: &str) -> TorrentRecord {
        let doc = Document::parse(html);
        let mut record = TorrentRecord::new(url);

        record.set_or_note("title", required(doc.text("#movie-info h1"), "#movie-info h1"));
        record.set_or_note("year", required(doc.nth_text("#movie-info h2", 0), "#movie-info h2"));
        record.set_or_note(
            "genre",
            required(doc.nth_text("#movie-info h2", 1), "#movie-info h2").map(|g| join_genres(&g)),
        );
        record.set_or_note(
            "rating",
            required(doc.text("[itemprop=ratingValue]"), "[itemprop=ratingValue]"),
        );
        record.set_or_note(
            "imdb",
            required(doc.attr(r#"[title="IMDb Rating"]"#, "href"), "[title=\"IMDb Rating\"]"),
        );
        record.set_or_note(
            "poster",
            required(doc.attr(POSTER, "src"), POSTER).map(|src| large_cover(&absolutize(&self.base_url, &src))),
        );
        record.set_or_note(
            "description",
            required(doc.nth_text("#synopsis p", 0), "#synopsis p"),
        );
        record.set_or_note("runtime", required(doc.nth_text(TECH_SPEC, RUNTIME_INDEX), TECH_SPEC));

        let screenshots: Vec<String> = doc
            .select("#screenshots a")
            .iter()
            .filter_map(|a| element_attr(a, "href"))
            .collect();
        if screenshots.is_empty() {
            record.note("screenshots", ScrapeError::missing("#screenshots a"));
        }
        record.set("screenshots", screenshots);

        let torrents = quality_torrents(&doc);
        if torrents.is_empty() {
            record.note("torrents", ScrapeError::missing(".modal-torrent"));
        }
        match serde_json::to_value(&torrents) {
            Ok(value) => record.set("torrents", value),
            Err(e) => record.note("torrents", e),
        }

        record
    }
}

fn required(value: Option<String>, selector: &str) -> Result<String> {
    value.ok_or_else(|| ScrapeError::missing(selector))
}

fn quality_torrents(doc: &Document) -> Vec<QualityTorrent> {
    doc.select(".modal-torrent")
        .iter()
        .map(|entry| {
            let sizes = scoped(entry, ".quality-size");
            let links = scoped(entry, ".download-torrent");
            QualityTorrent {
                quality: scoped(entry, ".modal-quality").first().map(element_text).unwrap_or_default(),
                kind: sizes.first().map(element_text).unwrap_or_default(),
                size: sizes.get(1).map(element_text).unwrap_or_default(),
                torrent_link: links.first().and_then(|a| element_attr(a, "href")),
                magnet_link: links.get(1).and_then(|a| element_attr(a, "href")),
            }
        })
        .collect()
}

/// `Action / Sci-Fi` -> `Action/Sci-Fi`
fn join_genres(genre: &str) -> String {
    genre
        .split('/')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Ask for the large cover instead of whatever size the page embeds
fn large_cover(src: &str) -> String {
    match src.rsplit_once('/') {
        Some((dir, _)) => format!("{}/large-cover.jpg", dir),
        None => "large-cover.jpg".to_string(),
    }
}
