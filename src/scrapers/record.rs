//! Scraped records and per-request results

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ScrapeError;

/// A field that could not be extracted from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

/// One torrent (or movie) as scraped from a site.
///
/// The set of fields is open: each site contributes whatever its pages
/// expose. `url` is always set. Fields that failed to extract are absent
/// from the map and listed in [`TorrentRecord::issues`].
#[derive(Debug, Clone, Serialize)]
pub struct TorrentRecord {
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(skip)]
    issues: Vec<FieldIssue>,
}

impl TorrentRecord {
    pub fn new(url: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("url".to_string(), Value::String(url.into()));
        Self {
            fields,
            issues: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        self.fields.get("url").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String value of a field, if it is one
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Set `field` from an extraction result, recording an issue on failure
    pub fn set_or_note<V: Into<Value>>(&mut self, field: &str, value: Result<V, ScrapeError>) {
        match value {
            Ok(v) => self.set(field, v),
            Err(e) => self.note(field, e),
        }
    }

    pub fn note(&mut self, field: &str, reason: impl ToString) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn has_issue(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

/// A count that a site may not be able to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Total {
    Known(u64),
    Unknown,
}

impl Total {
    pub fn known(self) -> Option<u64> {
        match self {
            Total::Known(n) => Some(n),
            Total::Unknown => None,
        }
    }
}

impl Serialize for Total {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Total::Known(n) => serializer.serialize_u64(*n),
            Total::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// Output of one scrape: the records plus the URL they came from
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub torrents: Vec<TorrentRecord>,
    pub scraped_url: String,
    pub total_pages: Total,
    pub total_torrents: Total,
    /// Set when the records are usable but the totals could not be read
    pub warning: Option<String>,
}

impl ScrapeResult {
    /// Result for a request the site refused to build a URL for
    pub fn empty() -> Self {
        Self {
            torrents: Vec::new(),
            scraped_url: String::new(),
            total_pages: Total::Known(0),
            total_torrents: Total::Known(0),
            warning: None,
        }
    }
}
