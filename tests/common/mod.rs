//! Shared fixtures: canned site pages and a wiremock-backed orchestrator

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use torscrape::scrapers::{create_client, HttpFetcher, SiteCatalog, SiteUrls};
use torscrape::Orchestrator;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Orchestrator whose sites all live on `server`
pub fn orchestrator(server: &MockServer) -> Orchestrator {
    orchestrator_with_timeout(server, Duration::from_secs(5))
}

pub fn orchestrator_with_timeout(server: &MockServer, timeout: Duration) -> Orchestrator {
    let urls = SiteUrls {
        x1337x: server.uri(),
        yts: server.uri(),
    };
    let client = create_client(timeout).expect("client");
    Orchestrator::new(SiteCatalog::new(&urls), Arc::new(HttpFetcher::new(client))).with_concurrency(3)
}

/// Serve `body` for GET `route`
pub async fn page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body).insert_header("content-type", "text/html"))
        .mount(server)
        .await;
}

/// 1337x results page with one row per id and an optional "last page" link
pub fn x1337_listing(ids: &[u32], last_page: Option<u32>) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr>
                  <td class="coll-1 name"><a href="/sub/1/0/" class="icon"></a><a href="/torrent/{id}/Matrix-Part-{id}/">Matrix Part {id}</a></td>
                  <td class="coll-2 seeds">{id}</td>
                  <td class="coll-4 size">1.{id} GB</td>
                </tr>"#
            )
        })
        .collect();

    let pagination = match last_page {
        Some(n) => format!(
            r#"<div class="pagination"><ul>
                 <li class="active"><a href="/search/matrix/1/">1</a></li>
                 <li><a href="/search/matrix/2/">2</a></li>
                 <li class="last"><a href="/search/matrix/{n}/">Last</a></li>
               </ul></div>"#
        ),
        None => String::new(),
    };

    format!(
        r#"<html><body><table class="table-list"><thead><tr><th>name</th></tr></thead>
           <tbody>{rows}</tbody></table>{pagination}</body></html>"#
    )
}

/// 1337x detail page; `with_images` toggles poster and gallery
pub fn x1337_detail(id: u32, with_images: bool) -> String {
    let images = if with_images {
        format!(
            r#"<div class="torrent-image"><img src="//cdn.example/poster-{id}.jpg"></div>
               <div id="description"><img class="descrimg" data-original="https://cdn.example/shot-{id}.th.jpg"></div>"#
        )
    } else {
        String::new()
    };

    format!(
        r#"<html><body>
           {images}
           <ul class="list"><li><a href="magnet:?xt=urn:btih:HASH{id}">Magnet Download</a></li></ul>
           <ul class="list">
             <li><strong>Category</strong> <span>Movies</span></li>
             <li><strong>Total size</strong> <span>1.{id} GB</span></li>
           </ul>
           <ul class="list">
             <li><strong>Seeders</strong> <span>{id}0</span></li>
           </ul>
           <div class="infohash-box"><p>Infohash : <span>HASH{id}</span></p></div>
           </body></html>"#
    )
}

pub fn yts_listing(slugs: &[&str]) -> String {
    let cards: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<div class="browse-movie-wrap">
                     <a href="/movies/{slug}" class="browse-movie-link"><img src="/cover.jpg"></a>
                     <div class="browse-movie-bottom"><a href="/movies/{slug}" class="browse-movie-title">{slug}</a></div>
                   </div>"#
            )
        })
        .collect();
    format!("<html><body><section>{cards}</section></body></html>")
}

pub fn yts_detail(title: &str) -> String {
    format!(
        r#"<html><body>
           <div id="movie-poster"><img src="/assets/images/movies/x/medium-cover.jpg"></div>
           <div id="movie-info"><h1>{title}</h1><h2>1999</h2><h2>Action / Sci-Fi</h2>
             <span itemprop="ratingValue">8.7</span></div>
           <div class="modal-torrent">
             <div class="modal-quality">1080p</div>
             <p class="quality-size">BluRay</p><p class="quality-size">2.1 GB</p>
             <a class="download-torrent" href="/torrent/download/AAA">Download</a>
             <a class="download-torrent" href="magnet:?xt=urn:btih:AAA">Magnet</a>
           </div>
           </body></html>"#
    )
}
