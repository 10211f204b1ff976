//! Test all scrapers with a live query

use std::sync::Arc;

use torscrape::config::{load_dotenv, Settings};
use torscrape::scrapers::{create_client, HttpFetcher, SiteCatalog, TorrentRecord};
use torscrape::{Orchestrator, SearchOptions, SearchRequest, TrendingRequest};

fn print_results(name: &str, results: &[TorrentRecord]) {
    println!("\n============================================================");
    println!("  {}", name);
    println!("============================================================");

    if results.is_empty() {
        println!("  ⚠ No results found (empty list)");
        return;
    }

    println!("  ✓ Found {} results:", results.len());
    for (i, r) in results.iter().take(5).enumerate() {
        let title = r.get_str("title").unwrap_or("<no title>");
        let magnet = if r.get("magnet").is_some() || r.get("torrents").is_some() { "links" } else { "no links" };
        println!("    {}. {} | {} | {} skipped fields", i + 1, truncate(title, 45), magnet, r.issues().len());
    }
    if results.len() > 5 {
        println!("    ... and {} more", results.len() - 5);
    }
}

#[tokio::main]
async fn main() {
    load_dotenv();
    torscrape::log::init_log(false);

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            return;
        }
    };

    let query = std::env::args().nth(1).unwrap_or_else(|| "matrix 1999".to_string());
    let count = std::env::args().any(|a| a == "--count");
    println!("\n🔍 Testing scrapers with query: \"{}\"", query);

    let client = match create_client(settings.fetch_timeout) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    let catalog = SiteCatalog::new(&settings.sites);
    let keys = catalog.keys();
    let orchestrator = Orchestrator::new(catalog, Arc::new(HttpFetcher::new(client)))
        .with_concurrency(settings.concurrency);

    let mut working = 0;
    for site in &keys {
        println!("\n--- Testing {} ---", site);
        let req = SearchRequest::new(site, &query);
        match orchestrator.search(&req, SearchOptions { count_torrents: count }).await {
            Ok(resp) => {
                print_results(site, &resp.data);
                println!(
                    "  url: {} | pages: {} | torrents: {}",
                    resp.scraped_url,
                    serde_json::to_string(&resp.total_pages).unwrap_or_default(),
                    serde_json::to_string(&resp.total_torrents).unwrap_or_default(),
                );
                if !resp.data.is_empty() {
                    working += 1;
                }
            }
            Err(e) => println!("  ✗ FAILED - {}", e),
        }
    }

    println!("\n--- Testing 1337x trending ---");
    match orchestrator.trending(&TrendingRequest::new("1337x")).await {
        Ok(resp) => print_results("1337x trending", &resp.data),
        Err(e) => println!("  ✗ FAILED - {}", e),
    }

    println!("\n============================================================");
    println!("  SUMMARY");
    println!("============================================================");
    println!("  {} of {} scrapers returned results", working, keys.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    }
}
