//! torscrape - scrapes torrent index sites into normalized JSON
//!
//! The [`scrapers`] module holds the per-site adapters and the shared
//! fetch/parse pipeline; [`orchestrator`] turns requests into response
//! envelopes; [`api`] serves them over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod log;
pub mod orchestrator;
pub mod scrapers;

pub use error::{Result, ScrapeError};
pub use orchestrator::{
    Orchestrator, SearchOptions, SearchRequest, SearchResponse, Status, TrendingRequest,
    TrendingResponse,
};
