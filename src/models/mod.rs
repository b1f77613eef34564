// src/models/mod.rs

//! Domain models for the scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;

// Re-export all public types
pub use config::{
    Backend, CleaningConfig, Config, ExtractionConfig, LinkConfig, OutputConfig, ScraperConfig,
    SiteConfig, parse_selector,
};
pub use record::{CLEAN_HEADERS, OrganizationRecord, RAW_HEADERS};

/// Summary of a scrape run.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub records: Vec<OrganizationRecord>,
    pub pages_total: usize,
    pub page_failures: usize,
    pub detail_total: usize,
    pub detail_failures: usize,
}

/// What the pagination probe saw on one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page: u32,
    /// Detail links on the page
    pub links: usize,
    /// Detail links not seen on earlier pages
    pub new_links: usize,
    /// Largest numeric label among pagination controls
    pub max_page_label: Option<u32>,
    /// Whether an enabled "next" control exists
    pub has_next: bool,
}
