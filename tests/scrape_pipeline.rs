//! End-to-end runs of the scraping loop against an in-memory site.

use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

use async_trait::async_trait;
use bde_scraper::error::{AppError, Result};
use bde_scraper::models::Config;
use bde_scraper::pipeline::{run_cleaner, run_probe, run_scraper, save_raw};
use bde_scraper::services::VisitedUrls;
use bde_scraper::source::PageSource;

const SITE: &str = "https://www.helloasso.com";

/// Serves canned pages and records every URL requested.
struct FakeSite {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeSite {
    fn new(pages: Vec<(String, &str)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, html)| (url, html.to_string()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FakeSite {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "HTTP 404 Not Found"))
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.scraper.request_delay_ms = 0;
    config
}

fn detail(slug: &str) -> String {
    format!("{SITE}/associations/{slug}")
}

const ALPHA: &str = r#"<html><head><title>HelloAsso</title></head><body>
<h1>BDE Alpha</h1>
<p>Président : Jean Dupont</p>
<p>12 rue de la Paix 75002 Paris</p>
<a href="https://www.facebook.com/bdealpha">Facebook</a>
<a href="https://bde-alpha.fr">Site</a>
<p>Écrire à noreply@helloasso.com ou bureau@bde-alpha.fr</p>
<p>Tél. 01 23 45 67 89</p>
</body></html>"#;

const NAMELESS: &str = "<html><body><p>rien</p></body></html>";

const DELTA: &str = r#"<html><body>
<h1>BDE Delta</h1>
<a href="https://www.helloasso.com/associations/bde-delta/adhesions">Adhérer</a>
</body></html>"#;

fn site() -> FakeSite {
    let config = config();
    let page0 = format!(
        r#"<html><body>
        <div class="association-card"><a href="/associations/bde-alpha">Alpha</a></div>
        <a href="/associations/bde-bravo">Bravo</a>
        <a href="/associations/bde-charlie">Charlie</a>
        <a href="{SITE}/associations/bde-alpha">Alpha again</a>
        <a href="?page=1&category_tags=bde">2</a>
        </body></html>"#
    );
    let page1 = r#"<html><body>
        <a href="/associations/bde-alpha">Alpha</a>
        <a href="/associations/bde-delta">Delta</a>
        </body></html>"#;

    FakeSite::new(vec![
        (config.scraper.listing_url(0), page0.as_str()),
        (config.scraper.listing_url(1), page1),
        (detail("bde-alpha"), ALPHA),
        (detail("bde-charlie"), NAMELESS),
        (detail("bde-delta"), DELTA),
    ])
}

#[tokio::test]
async fn scrapes_each_detail_page_once_and_skips_failures() {
    let config = config();
    let site = site();
    let mut visited = VisitedUrls::new();

    let outcome = run_scraper(&config, &site, 0, 2, &mut visited).await.unwrap();

    assert_eq!(outcome.pages_total, 3);
    assert_eq!(outcome.page_failures, 1);
    assert_eq!(outcome.detail_total, 4);
    assert_eq!(outcome.detail_failures, 1);
    assert_eq!(visited.len(), 4);

    let names: Vec<&str> = outcome.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["BDE Alpha", "", "BDE Delta"]);

    let alpha = &outcome.records[0];
    assert_eq!(alpha.source_url, detail("bde-alpha"));
    assert_eq!(alpha.email, "bureau@bde-alpha.fr");
    assert_eq!(alpha.website, "https://bde-alpha.fr");
    assert_eq!(alpha.phone, "01 23 45 67 89");
    assert_eq!(alpha.contact_first_name, "Jean");
    assert_eq!(alpha.contact_last_name, "Dupont");
    assert!(alpha.address.starts_with("12 rue de la Paix 75002 Paris"));

    assert_eq!(outcome.records[2].website, "");

    let alpha_fetches = site
        .requests()
        .iter()
        .filter(|url| **url == detail("bde-alpha"))
        .count();
    assert_eq!(alpha_fetches, 1);
}

#[tokio::test]
async fn visited_set_carries_across_runs() {
    let config = config();
    let site = site();
    let mut visited = VisitedUrls::new();
    visited.insert(detail("bde-alpha"));

    let outcome = run_scraper(&config, &site, 1, 1, &mut visited).await.unwrap();

    assert_eq!(outcome.detail_total, 1);
    assert_eq!(outcome.records[0].name, "BDE Delta");
    assert!(!site.requests().contains(&detail("bde-alpha")));
}

#[tokio::test]
async fn scrape_then_clean_is_stable() {
    let config = config();
    let site = site();
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let clean_once = dir.path().join("clean_once.csv");
    let clean_twice = dir.path().join("clean_twice.csv");

    let outcome = run_scraper(&config, &site, 0, 1, &mut VisitedUrls::new())
        .await
        .unwrap();
    save_raw(&config, &outcome, &raw).unwrap();

    let first = run_cleaner(&config, Some(&raw), Some(&clean_once)).unwrap();
    assert_eq!(first.rows_in, 3);
    assert_eq!(first.rows_out, 2);

    let second = run_cleaner(&config, Some(&clean_once), Some(&clean_twice)).unwrap();
    assert_eq!(second.dropped(), 0);
    assert_eq!(
        fs::read(&clean_once).unwrap(),
        fs::read(&clean_twice).unwrap()
    );

    let content = fs::read_to_string(&clean_once).unwrap();
    assert!(content.contains("BDE Alpha,Dupont,Jean,12 rue de la Paix 75002 Paris,"));
}

#[tokio::test]
async fn pagination_scan_stops_at_first_page_without_new_links() {
    let config = config();
    let page0 = r#"<html><body>
        <a href="/associations/a">A</a><a href="/associations/b">B</a>
        <a href="?page=1">2</a><a href="?page=2">3</a>
        <button aria-label="Page suivante">›</button>
        </body></html>"#;
    let page1 = r#"<html><body><a href="/associations/c">C</a></body></html>"#;
    let page2 = r#"<html><body><a href="/associations/a">A</a>
        <button disabled>Suivant</button></body></html>"#;
    let site = FakeSite::new(vec![
        (config.scraper.listing_url(0), page0),
        (config.scraper.listing_url(1), page1),
        (config.scraper.listing_url(2), page2),
    ]);

    let reports = run_probe(&config, &site, 0, 9).await.unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].links, 2);
    assert_eq!(reports[0].max_page_label, Some(3));
    assert!(reports[0].has_next);
    assert_eq!(reports[1].new_links, 1);
    assert_eq!(reports[2].new_links, 0);
    assert!(!reports[2].has_next);
    assert_eq!(site.requests().len(), 3);
}

#[tokio::test]
async fn unparsable_listing_url_is_a_page_failure() {
    let mut config = config();
    config.scraper.base_url = "annuaire-bde".to_string();
    let site = FakeSite::new(vec![(
        config.scraper.listing_url(0),
        r#"<a href="/associations/bde-alpha">Alpha</a>"#,
    )]);

    let outcome = run_scraper(&config, &site, 0, 0, &mut VisitedUrls::new())
        .await
        .unwrap();

    assert_eq!(outcome.page_failures, 1);
    assert_eq!(outcome.detail_total, 0);
    assert!(outcome.records.is_empty());
}
