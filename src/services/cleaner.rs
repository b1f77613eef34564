//! Post-processing of raw scrape output.
//!
//! Address values scraped from page source often carry markup or inline CSS,
//! and website values sometimes carry trailing punctuation. The cleaner
//! repairs both and drops rows without an organization name.

use regex::Regex;

use crate::error::Result;
use crate::models::{CleaningConfig, OrganizationRecord};

/// Guards the fixpoint loop in [`RecordCleaner::clean_address`].
const MAX_ADDRESS_PASSES: usize = 8;

/// Applies the cleaning rules to records.
pub struct RecordCleaner {
    tags: Regex,
    css_properties: Regex,
    urls: Regex,
    symbols: Regex,
    whitespace: Regex,
    website: Regex,
    rejected_website_markers: Vec<String>,
}

impl RecordCleaner {
    pub fn new(config: &CleaningConfig) -> Result<Self> {
        Ok(Self {
            tags: Regex::new(r"<[^>]+>")?,
            css_properties: Regex::new(r"[a-zA-Z-]+:[^;]+;")?,
            urls: Regex::new(r"https?://[^\s]+")?,
            symbols: Regex::new(r"[{}%\[\]@#]+")?,
            whitespace: Regex::new(r"\s+")?,
            website: Regex::new(r"https?://[^\s,;)]+[a-zA-Z0-9/]")?,
            rejected_website_markers: config.rejected_website_markers.clone(),
        })
    }

    /// Clean every record, dropping those without a name.
    pub fn clean_all(&self, records: Vec<OrganizationRecord>) -> Vec<OrganizationRecord> {
        records
            .into_iter()
            .filter_map(|record| self.clean(record))
            .collect()
    }

    /// Clean one record; `None` if it has no organization name.
    pub fn clean(&self, mut record: OrganizationRecord) -> Option<OrganizationRecord> {
        if record.name.trim().is_empty() {
            return None;
        }
        record.address = self.clean_address(&record.address);
        record.website = self.clean_website(&record.website);
        Some(record)
    }

    /// Strip markup and CSS fragments from an address.
    ///
    /// Removing one fragment can expose another, so the substitutions run
    /// until the value is stable.
    pub fn clean_address(&self, address: &str) -> String {
        if Self::is_stylesheet(address) {
            return String::new();
        }

        let mut current = address.to_string();
        for _ in 0..MAX_ADDRESS_PASSES {
            let next = self.address_pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn is_stylesheet(text: &str) -> bool {
        text.starts_with("100%;font-style") || text.contains("@font-face")
    }

    fn address_pass(&self, text: &str) -> String {
        let text = self.tags.replace_all(text, "");
        let text = self.css_properties.replace_all(&text, "");
        let text = self.urls.replace_all(&text, "");
        let text = self.symbols.replace_all(&text, "");
        let text = self.whitespace.replace_all(&text, " ");
        text.trim().to_string()
    }

    /// Keep the first well-formed URL unless it points back at the source
    /// site or a tracking endpoint.
    pub fn clean_website(&self, website: &str) -> String {
        let Some(found) = self.website.find(website) else {
            return String::new();
        };
        let url = found.as_str().trim_end_matches(['.', ',', ';', ')']);
        if self
            .rejected_website_markers
            .iter()
            .any(|marker| url.contains(marker.as_str()))
        {
            return String::new();
        }
        url.to_string()
    }
}
