//! Application configuration structures.

use std::fs;
use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP, pagination and politeness settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Facts about the source site itself
    #[serde(default)]
    pub site: SiteConfig,

    /// Field extraction rules for detail pages
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Detail link collection rules for listing pages
    #[serde(default)]
    pub links: LinkConfig,

    /// Post-processing of raw output
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// Output file locations
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    ///
    /// Every selector and pattern is compiled here so a broken edit to the
    /// config file is reported before any page is fetched.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.start_page > self.scraper.end_page {
            return Err(AppError::validation(format!(
                "scraper.start_page ({}) is after scraper.end_page ({})",
                self.scraper.start_page, self.scraper.end_page
            )));
        }
        if self.site.domain.trim().is_empty() {
            return Err(AppError::validation("site.domain is empty"));
        }
        if self.extraction.name_selectors.is_empty() {
            return Err(AppError::validation("No name selectors defined"));
        }
        if self.links.selectors.is_empty() {
            return Err(AppError::validation("No link selectors defined"));
        }
        if self.links.path_segment.is_empty() {
            return Err(AppError::validation("links.path_segment is empty"));
        }

        let selectors = self
            .extraction
            .name_selectors
            .iter()
            .chain(std::iter::once(&self.extraction.website_selector))
            .chain(self.links.selectors.iter());
        for s in selectors {
            parse_selector(s)?;
        }

        let patterns = std::iter::once(&self.extraction.email_pattern)
            .chain(self.extraction.phone_patterns.iter())
            .chain(self.extraction.address_patterns.iter())
            .chain(self.extraction.person_patterns.iter());
        for p in patterns {
            Regex::new(p)?;
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Which page source renders pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Plain HTTP GET, no JavaScript
    #[default]
    Http,
    /// Headless Chrome (requires the `browser` feature)
    Browser,
}

/// HTTP client, pagination and politeness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Listing search URL without query string
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Value of the `category_tags` query parameter
    #[serde(default = "defaults::category_tag")]
    pub category_tag: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header for HTTP requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between consecutive page visits in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// First listing page (inclusive)
    #[serde(default)]
    pub start_page: u32,

    /// Last listing page (inclusive)
    #[serde(default = "defaults::end_page")]
    pub end_page: u32,

    /// Page rendering backend
    #[serde(default)]
    pub backend: Backend,

    /// Extra wait after navigation for JavaScript rendering (browser only)
    #[serde(default = "defaults::render_wait")]
    pub render_wait_ms: u64,
}

impl ScraperConfig {
    /// URL of one listing page.
    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}?page={}&category_tags={}",
            self.base_url, page, self.category_tag
        )
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            category_tag: defaults::category_tag(),
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            start_page: 0,
            end_page: defaults::end_page(),
            backend: Backend::default(),
            render_wait_ms: defaults::render_wait(),
        }
    }
}

/// The source site's own identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Registrable domain of the source site; links here are never "external"
    #[serde(default = "defaults::site_domain")]
    pub domain: String,

    /// Generic titles that are never an organization name
    #[serde(default = "defaults::brand_names")]
    pub brand_names: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: defaults::site_domain(),
            brand_names: defaults::brand_names(),
        }
    }
}

/// Ordered extraction rules for a detail page.
///
/// Order inside every list is significant: the first rule that yields a
/// value wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "defaults::name_selectors")]
    pub name_selectors: Vec<String>,

    #[serde(default = "defaults::website_selector")]
    pub website_selector: String,

    /// Hosts (and their subdomains) never accepted as a website
    #[serde(default = "defaults::social_domains")]
    pub social_domains: Vec<String>,

    #[serde(default = "defaults::email_pattern")]
    pub email_pattern: String,

    /// Substrings marking an address as system mail
    #[serde(default = "defaults::email_blocked_markers")]
    pub email_blocked_markers: Vec<String>,

    /// Local parts rejected when the address is at the site's own domain
    #[serde(default = "defaults::email_generic_locals")]
    pub email_generic_locals: Vec<String>,

    #[serde(default = "defaults::phone_patterns")]
    pub phone_patterns: Vec<String>,

    /// Matched case-insensitively
    #[serde(default = "defaults::address_patterns")]
    pub address_patterns: Vec<String>,

    /// Each pattern must have one capture group holding "First Last"
    #[serde(default = "defaults::person_patterns")]
    pub person_patterns: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            name_selectors: defaults::name_selectors(),
            website_selector: defaults::website_selector(),
            social_domains: defaults::social_domains(),
            email_pattern: defaults::email_pattern(),
            email_blocked_markers: defaults::email_blocked_markers(),
            email_generic_locals: defaults::email_generic_locals(),
            phone_patterns: defaults::phone_patterns(),
            address_patterns: defaults::address_patterns(),
            person_patterns: defaults::person_patterns(),
        }
    }
}

/// Listing page link collection rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Selector candidates, from most specific to most generic
    #[serde(default = "defaults::link_selectors")]
    pub selectors: Vec<String>,

    /// Path fragment every detail page URL contains
    #[serde(default = "defaults::path_segment")]
    pub path_segment: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            selectors: defaults::link_selectors(),
            path_segment: defaults::path_segment(),
        }
    }
}

/// Cleaning pass settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Website values containing any of these are discarded
    #[serde(default = "defaults::rejected_website_markers")]
    pub rejected_website_markers: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            rejected_website_markers: defaults::rejected_website_markers(),
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::output_dir")]
    pub dir: String,

    #[serde(default = "defaults::raw_prefix")]
    pub raw_prefix: String,

    #[serde(default = "defaults::clean_prefix")]
    pub clean_prefix: String,

    /// Also write the raw records as JSON next to the CSV
    #[serde(default)]
    pub write_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            raw_prefix: defaults::raw_prefix(),
            clean_prefix: defaults::clean_prefix(),
            write_json: false,
        }
    }
}

mod defaults {
    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // Scraper defaults
    pub fn base_url() -> String {
        "https://www.helloasso.com/e/recherche/associations".into()
    }
    pub fn category_tag() -> String {
        "bde".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn accept_language() -> String {
        "fr-FR,fr;q=0.9,en;q=0.8".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        2000
    }
    pub fn end_page() -> u32 {
        29
    }
    pub fn render_wait() -> u64 {
        2000
    }

    // Site defaults
    pub fn site_domain() -> String {
        "helloasso.com".into()
    }
    pub fn brand_names() -> Vec<String> {
        strings(&["HelloAsso"])
    }

    // Extraction defaults
    pub fn name_selectors() -> Vec<String> {
        strings(&["h1", ".title", ".association-name", ".name", "title"])
    }
    pub fn website_selector() -> String {
        "a[href^='http']".into()
    }
    pub fn social_domains() -> Vec<String> {
        strings(&[
            "facebook.com",
            "twitter.com",
            "x.com",
            "instagram.com",
            "linkedin.com",
            "youtube.com",
        ])
    }
    pub fn email_pattern() -> String {
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b".into()
    }
    pub fn email_blocked_markers() -> Vec<String> {
        strings(&["noreply", "no-reply", "support", "admin", "webmaster"])
    }
    pub fn email_generic_locals() -> Vec<String> {
        strings(&["info", "contact"])
    }
    pub fn phone_patterns() -> Vec<String> {
        strings(&[
            r"(?:\+33|0)[1-9][0-9]{8}",
            r"0[1-9](?:[\s.-]?[0-9]{2}){4}",
            r"\+33\s?[1-9](?:[\s.-]?[0-9]{2}){4}",
        ])
    }
    pub fn address_patterns() -> Vec<String> {
        strings(&[
            r"\d+[,\s]+(?:rue|avenue|boulevard|place|impasse|allée)[^,\n]+\d{5}[^,\n]*",
            r"(?:rue|avenue|boulevard|place|impasse|allée)[^,\n]+\d{5}[^,\n]*",
            r"\d{5}[^,\n]+?(?:rue|avenue|boulevard|place|impasse|allée)[^,\n]*",
        ])
    }
    pub fn person_patterns() -> Vec<String> {
        strings(&[
            r"(?:Président|Présidente|Contact|Responsable)[\s:]+([A-Z][a-z]+\s+[A-Z][a-z]+)",
            r"([A-Z][a-z]+\s+[A-Z][a-z]+)\s*[-–]\s*(?:Président|Présidente|Contact|Responsable)",
        ])
    }

    // Link defaults
    pub fn link_selectors() -> Vec<String> {
        strings(&[
            "a[href*='/associations/']",
            ".association-card a",
            ".card a[href*='associations']",
            "a[href*='bde']",
            ".result-item a",
            ".search-result a",
        ])
    }
    pub fn path_segment() -> String {
        "/associations/".into()
    }

    // Cleaning defaults
    pub fn rejected_website_markers() -> Vec<String> {
        strings(&["helloasso.com", "api.api-engagement"])
    }

    // Output defaults
    pub fn output_dir() -> String {
        "data".into()
    }
    pub fn raw_prefix() -> String {
        "bde_scraping_results".into()
    }
    pub fn clean_prefix() -> String {
        "bde_clean_data".into()
    }
}
