//! Error type shared by the scrapers and the orchestrator

use thiserror::Error;

/// Everything that can go wrong while scraping a site
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Only ever recorded as a field issue, never returned for a whole page
    #[error("no element matches `{selector}`")]
    MissingElement { selector: String },

    #[error("site `{0}` is not supported")]
    UnsupportedSite(String),

    #[error("category `{0}` is not supported")]
    UnsupportedCategory(String),

    #[error("section `{0}` is not supported")]
    UnsupportedSection(String),

    #[error("{site} does not expose pagination")]
    PaginationUnsupported { site: &'static str },

    #[error("could not read a page number from `{0}`")]
    PageNumber(String),
}

impl ScrapeError {
    pub(crate) fn missing(selector: &str) -> Self {
        Self::MissingElement {
            selector: selector.to_string(),
        }
    }
}

/// Result alias for scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;
