// src/pipeline/probe.rs

//! Pagination exploration.
//!
//! Walks listing pages without visiting details to find where the listing
//! actually ends and how many organizations it holds.

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{Config, PageReport};
use crate::pipeline::Pacer;
use crate::services::{LinkCollector, PaginationInspector, VisitedUrls};
use crate::source::{PageSource, create_source};
use crate::utils::log::{header, separator, summary};

/// Probe listing pages `start..=end`, stopping at the first page that
/// brings no new detail links.
///
/// Pages that fail to load are skipped.
pub async fn run_probe(
    config: &Config,
    source: &dyn PageSource,
    start: u32,
    end: u32,
) -> Result<Vec<PageReport>> {
    let collector = LinkCollector::new(&config.links)?;
    let inspector = PaginationInspector::new()?;
    let mut pacer = Pacer::new(config.scraper.request_delay_ms);
    let mut seen = VisitedUrls::new();
    let mut reports = Vec::new();

    header(&format!("Probing listing pages {start}..={end}"));

    for page in start..=end {
        let listing_url = config.scraper.listing_url(page);

        pacer.wait().await;
        let html = match source.fetch(&listing_url).await {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Skipping listing page {page}: {e}");
                continue;
            }
        };
        let page_url = match Url::parse(&listing_url) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Skipping listing page {page}: bad URL {listing_url}: {e}");
                continue;
            }
        };

        let (links, hints) = {
            let document = Html::parse_document(&html);
            let links = collector.collect(&document, &page_url, &VisitedUrls::new());
            (links, inspector.inspect(&document))
        };
        let new_links = links.iter().filter(|link| seen.insert(link.as_str())).count();

        let report = PageReport {
            page,
            links: links.len(),
            new_links,
            max_page_label: hints.max_page_label,
            has_next: hints.has_next,
        };
        log::info!(
            "Page {:>3}: {:>3} links, {:>3} new, max label {}, next {}",
            report.page,
            report.links,
            report.new_links,
            report
                .max_page_label
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
            if report.has_next { "yes" } else { "no" },
        );
        reports.push(report);

        if new_links == 0 {
            log::info!("No new links on page {page}, stopping");
            break;
        }
    }

    separator();
    summary(
        "Pagination",
        &[
            ("Pages probed", reports.len().to_string()),
            (
                "Useful pages",
                reports.iter().filter(|r| r.new_links > 0).count().to_string(),
            ),
            ("Unique links", seen.len().to_string()),
            ("Estimated total", estimate_total(&reports).to_string()),
        ],
    );

    Ok(reports)
}

/// `probe` command with the configured page source.
pub async fn run_probe_command(config: &Config, start: u32, end: u32) -> Result<Vec<PageReport>> {
    let source = create_source(&config.scraper)?;
    run_probe(config, source.as_ref(), start, end).await
}

/// Estimated organization count: pages × average links per useful page.
///
/// The page count is the largest pagination label seen, or the number of
/// pages that brought new links when no label was found or it is smaller.
pub fn estimate_total(reports: &[PageReport]) -> usize {
    let useful: Vec<&PageReport> = reports.iter().filter(|r| r.new_links > 0).collect();
    if useful.is_empty() {
        return 0;
    }
    let links: usize = useful.iter().map(|r| r.links).sum();
    let labelled = reports
        .iter()
        .filter_map(|r| r.max_page_label)
        .max()
        .map_or(0, |n| n as usize);
    if labelled <= useful.len() {
        return links;
    }
    (labelled * links + useful.len() / 2) / useful.len()
}
