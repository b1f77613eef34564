// src/services/extractor.rs

//! Record extraction from organization detail pages.
//!
//! Each field has an ordered list of rules and the first rule that yields a
//! value wins. Rules never fail: a field with no match stays empty and the
//! remaining fields are still extracted.

use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};

use crate::error::Result;
use crate::models::{ExtractionConfig, OrganizationRecord, SiteConfig, parse_selector};
use crate::utils::{get_domain, host_matches, normalize_whitespace};

/// Turns a rendered detail page into an [`OrganizationRecord`].
pub struct RecordExtractor {
    name_selectors: Vec<Selector>,
    website_selector: Selector,
    email_pattern: Regex,
    phone_patterns: Vec<Regex>,
    address_patterns: Vec<Regex>,
    person_patterns: Vec<Regex>,
    email_blocked_markers: Vec<String>,
    email_generic_locals: Vec<String>,
    social_domains: Vec<String>,
    site_domain: String,
    brand_names: Vec<String>,
}

impl RecordExtractor {
    /// Compile the configured selectors and patterns.
    pub fn new(config: &ExtractionConfig, site: &SiteConfig) -> Result<Self> {
        let name_selectors = config
            .name_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name_selectors,
            website_selector: parse_selector(&config.website_selector)?,
            email_pattern: Regex::new(&config.email_pattern)?,
            phone_patterns: compile_all(&config.phone_patterns, false)?,
            address_patterns: compile_all(&config.address_patterns, true)?,
            person_patterns: compile_all(&config.person_patterns, false)?,
            email_blocked_markers: lowercase_all(&config.email_blocked_markers),
            email_generic_locals: lowercase_all(&config.email_generic_locals),
            social_domains: lowercase_all(&config.social_domains),
            site_domain: site.domain.to_lowercase(),
            brand_names: site.brand_names.clone(),
        })
    }

    /// Parse `page_html` and extract a record from it.
    pub fn extract_html(&self, page_html: &str, source_url: &str) -> OrganizationRecord {
        let document = Html::parse_document(page_html);
        self.extract(page_html, &document, source_url)
    }

    /// Extract a record from a page's source text and its parsed DOM.
    ///
    /// Text rules (email, phone, address, person) scan `page_html`; element
    /// rules (name, website) query `document`.
    pub fn extract(
        &self,
        page_html: &str,
        document: &Html,
        source_url: &str,
    ) -> OrganizationRecord {
        let mut record = OrganizationRecord::new(source_url);

        if let Some(name) = self.extract_name(document) {
            record.name = name;
        }
        if let Some(email) = self.extract_email(page_html) {
            record.email = email;
        }
        if let Some(phone) = first_match(&self.phone_patterns, page_html) {
            record.phone = phone;
        }
        if let Some(website) = self.extract_website(document) {
            record.website = website;
        }
        if let Some(address) = first_match(&self.address_patterns, page_html) {
            record.address = address;
        }
        if let Some((first, last)) = self.extract_person(page_html) {
            record.contact_first_name = first;
            record.contact_last_name = last;
        }

        record
    }

    fn extract_name(&self, document: &Html) -> Option<String> {
        self.name_selectors.iter().find_map(|selector| {
            let element = document.select(selector).next()?;
            let text = normalize_whitespace(&element.text().collect::<String>());
            let is_brand = self
                .brand_names
                .iter()
                .any(|brand| brand.eq_ignore_ascii_case(&text));
            (!text.is_empty() && !is_brand).then_some(text)
        })
    }

    fn extract_email(&self, text: &str) -> Option<String> {
        let candidates: Vec<&str> = self
            .email_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();

        candidates
            .iter()
            .find(|email| !self.is_system_email(email))
            .or_else(|| candidates.first())
            .map(|email| email.to_string())
    }

    fn is_system_email(&self, email: &str) -> bool {
        let lower = email.to_lowercase();
        if self
            .email_blocked_markers
            .iter()
            .any(|marker| lower.contains(marker.as_str()))
        {
            return true;
        }

        let Some((local, domain)) = lower.split_once('@') else {
            return false;
        };
        host_matches(domain, &self.site_domain)
            && self.email_generic_locals.iter().any(|l| l == local)
    }

    fn extract_website(&self, document: &Html) -> Option<String> {
        document
            .select(&self.website_selector)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| self.is_external(href))
            .map(str::to_string)
    }

    fn is_external(&self, href: &str) -> bool {
        let Some(host) = get_domain(href) else {
            return false;
        };
        !host_matches(&host, &self.site_domain)
            && !self
                .social_domains
                .iter()
                .any(|social| host_matches(&host, social))
    }

    fn extract_person(&self, text: &str) -> Option<(String, String)> {
        let full_name = self.person_patterns.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })?;

        let (first, last) = full_name.split_once(char::is_whitespace)?;
        Some((first.to_string(), last.trim().to_string()))
    }
}

fn compile_all(patterns: &[String], case_insensitive: bool) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(Into::into)
        })
        .collect()
}

/// First match of the first pattern that matches anywhere in `text`.
fn first_match(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|m| m.as_str().trim().to_string())
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}
