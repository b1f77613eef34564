// src/pipeline/scrape.rs

//! Listing → detail scraping loop.

use std::path::{Path, PathBuf};

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{Config, ScrapeOutcome};
use crate::pipeline::Pacer;
use crate::services::{LinkCollector, RecordExtractor, VisitedUrls};
use crate::source::{PageSource, create_source};
use crate::storage::{RecordStore, write_json, write_raw_csv};
use crate::utils::log::{header, percent, sub_item, summary};

/// Scrape listing pages `start..=end` and every unseen detail page they link.
///
/// Pages are fetched one at a time with `request_delay_ms` between requests.
/// A page that fails to load is logged and skipped; the run keeps going,
/// so only setup can return an error.
///
/// `visited` is read by the link collector and updated as details are
/// processed, so a caller can thread one set through several runs.
pub async fn run_scraper(
    config: &Config,
    source: &dyn PageSource,
    start: u32,
    end: u32,
    visited: &mut VisitedUrls,
) -> Result<ScrapeOutcome> {
    let extractor = RecordExtractor::new(&config.extraction, &config.site)?;
    let collector = LinkCollector::new(&config.links)?;
    let mut pacer = Pacer::new(config.scraper.request_delay_ms);
    let mut outcome = ScrapeOutcome::default();

    header(&format!("Scraping listing pages {start}..={end}"));

    for page in start..=end {
        let listing_url = config.scraper.listing_url(page);
        outcome.pages_total += 1;

        pacer.wait().await;
        let links = match source.fetch(&listing_url).await {
            Ok(html) => match Url::parse(&listing_url) {
                Ok(page_url) => {
                    let document = Html::parse_document(&html);
                    collector.collect(&document, &page_url, visited)
                }
                Err(e) => {
                    log::warn!("Skipping listing page {page}: bad URL {listing_url}: {e}");
                    outcome.page_failures += 1;
                    continue;
                }
            },
            Err(e) => {
                log::warn!("Skipping listing page {page}: {e}");
                outcome.page_failures += 1;
                continue;
            }
        };

        log::info!("Page {page}: {} new detail links", links.len());

        for link in links {
            if !visited.insert(link.as_str()) {
                continue;
            }
            outcome.detail_total += 1;

            pacer.wait().await;
            let html = match source.fetch(&link).await {
                Ok(html) => html,
                Err(e) => {
                    log::warn!("Skipping detail page: {e}");
                    outcome.detail_failures += 1;
                    continue;
                }
            };

            let record = extractor.extract_html(&html, &link);
            if record.name.is_empty() {
                log::info!("  [{}] (no name) {link}", outcome.records.len() + 1);
            } else {
                log::info!("  [{}] {}", outcome.records.len() + 1, record.name);
            }
            for (column, value) in record.filled_fields() {
                log::debug!("      {column}: {value}");
            }
            outcome.records.push(record);
        }
    }

    summary(
        "Scrape",
        &[
            ("Listing pages", outcome.pages_total.to_string()),
            ("Listing failures", outcome.page_failures.to_string()),
            ("Detail pages", outcome.detail_total.to_string()),
            ("Detail failures", outcome.detail_failures.to_string()),
            ("Records", outcome.records.len().to_string()),
            (
                "Success rate",
                percent(outcome.records.len(), outcome.detail_total),
            ),
        ],
    );

    Ok(outcome)
}

/// Full `scrape` command: build the page source, run the loop, save results.
///
/// Returns the path of the raw CSV. Setup failures (page source, selectors,
/// patterns) abort before any page is fetched; once the loop starts, every
/// failure is per page, so whatever was collected is always written.
pub async fn run_scrape(
    config: &Config,
    start: u32,
    end: u32,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let source = create_source(&config.scraper)?;
    let mut visited = VisitedUrls::new();
    let store = RecordStore::new(&config.output.dir);
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| store.timestamped_path(&config.output.raw_prefix, "csv"));

    let outcome = run_scraper(config, source.as_ref(), start, end, &mut visited).await?;
    save_raw(config, &outcome, &path)?;
    Ok(path)
}

/// Write the raw CSV and, when enabled, a JSON copy next to it.
pub fn save_raw(config: &Config, outcome: &ScrapeOutcome, path: &Path) -> Result<()> {
    write_raw_csv(path, &outcome.records)?;
    log::info!("Saved {} records to {}", outcome.records.len(), path.display());

    if config.output.write_json {
        let json_path = path.with_extension("json");
        write_json(&json_path, &outcome.records)?;
        sub_item(&format!("JSON copy: {}", json_path.display()));
    }
    Ok(())
}
