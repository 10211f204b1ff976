//! Registry of the supported sites

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{SiteAdapter, X1337x, Yts};
use crate::error::{Result, ScrapeError};

/// Site keys that are recognized but have no scraper yet
pub const PENDING_SITES: &[&str] = &["rarbg", "limetorrents"];

/// Where each site lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    pub x1337x: String,
    pub yts: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            x1337x: super::x1337::BASE_URL.to_string(),
            yts: super::yts::BASE_URL.to_string(),
        }
    }
}

/// Site key -> adapter. Built once at startup and only read afterwards.
#[derive(Clone)]
pub struct SiteCatalog {
    sites: HashMap<&'static str, Arc<dyn SiteAdapter>>,
}

impl SiteCatalog {
    pub fn new(urls: &SiteUrls) -> Self {
        let x1337x: Arc<dyn SiteAdapter> = Arc::new(X1337x::new(urls.x1337x.clone()));
        let yts: Arc<dyn SiteAdapter> = Arc::new(Yts::new(urls.yts.clone()));
        Self::from_adapters(vec![x1337x, yts])
    }

    pub fn from_adapters(adapters: Vec<Arc<dyn SiteAdapter>>) -> Self {
        let sites = adapters.into_iter().map(|a| (a.key(), a)).collect();
        Self { sites }
    }

    /// Adapter for `key` (case-insensitive)
    pub fn get(&self, key: &str) -> Result<Arc<dyn SiteAdapter>> {
        let key = key.to_lowercase();
        if let Some(site) = self.sites.get(key.as_str()) {
            return Ok(Arc::clone(site));
        }
        if PENDING_SITES.contains(&key.as_str()) {
            debug!(site = %key, "site recognized but not yet supported");
        }
        Err(ScrapeError::UnsupportedSite(key))
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.sites.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for SiteCatalog {
    fn default() -> Self {
        Self::new(&SiteUrls::default())
    }
}
