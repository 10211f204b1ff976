//! Process settings read from the environment (and `.env` files)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::orchestrator::DEFAULT_CONCURRENCY;
use crate::scrapers::SiteUrls;

/// Directory name under the user config dir
pub const APP_DIR: &str = "torscrape";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub fetch_timeout: Duration,
    /// Detail pages (and count pages) fetched at once
    pub concurrency: usize,
    /// Whether searches count every torrent unless the request says otherwise
    pub count_torrents: bool,
    pub log_to_file: bool,
    pub sites: SiteUrls,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            fetch_timeout: Duration::from_secs(15),
            concurrency: DEFAULT_CONCURRENCY,
            count_torrents: true,
            log_to_file: false,
            sites: SiteUrls::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key -> value source; unset keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let concurrency: usize = parse_or(get("SCRAPE_CONCURRENCY"), "SCRAPE_CONCURRENCY", defaults.concurrency)?;
        if concurrency == 0 {
            return Err(anyhow!("SCRAPE_CONCURRENCY must be at least 1"));
        }

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            fetch_timeout: Duration::from_secs(parse_or(
                get("FETCH_TIMEOUT_SECS"),
                "FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )?),
            concurrency,
            count_torrents: parse_or(get("COUNT_TORRENTS"), "COUNT_TORRENTS", defaults.count_torrents)?,
            log_to_file: parse_or(get("LOG_TO_FILE"), "LOG_TO_FILE", defaults.log_to_file)?,
            sites: SiteUrls {
                x1337x: get("X1337X_BASE_URL").unwrap_or(defaults.sites.x1337x),
                yts: get("YTS_BASE_URL").unwrap_or(defaults.sites.yts),
            },
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Load `.env` - check current directory first, then config directory
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }
    let config_env = dirs::config_dir()?.join(APP_DIR).join(".env");
    dotenvy::from_path(&config_env).ok()?;
    Some(config_env)
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("invalid {} value `{}`: {}", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(settings(&[]).unwrap(), Settings::default());
    }

    #[test]
    fn reads_every_key() {
        let s = settings(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("SCRAPE_CONCURRENCY", "8"),
            ("COUNT_TORRENTS", "false"),
            ("LOG_TO_FILE", "true"),
            ("X1337X_BASE_URL", "http://localhost:1"),
            ("YTS_BASE_URL", "http://localhost:2"),
        ])
        .unwrap();

        assert_eq!(s.addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(s.fetch_timeout, Duration::from_secs(5));
        assert_eq!(s.concurrency, 8);
        assert!(!s.count_torrents);
        assert!(s.log_to_file);
        assert_eq!(s.sites.x1337x, "http://localhost:1");
        assert_eq!(s.sites.yts, "http://localhost:2");
    }

    #[test]
    fn blank_values_keep_defaults() {
        assert_eq!(settings(&[("PORT", "  ")]).unwrap().port, 3000);
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = settings(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(settings(&[("SCRAPE_CONCURRENCY", "0")]).is_err());
        assert!(settings(&[("COUNT_TORRENTS", "maybe")]).is_err());
    }
}
