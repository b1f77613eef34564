//! Detail link collection from listing pages.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{LinkConfig, parse_selector};
use crate::utils::resolve_url;

/// Absolute URLs already visited during one run.
///
/// Owned by the control loop and dropped with it; nothing is persisted.
#[derive(Debug, Default, Clone)]
pub struct VisitedUrls {
    urls: HashSet<String>,
}

impl VisitedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a URL as visited. Returns `false` if it already was.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Collects organization detail links from a listing page.
pub struct LinkCollector {
    selectors: Vec<Selector>,
    path_segment: String,
}

impl LinkCollector {
    /// Compile the configured selector candidates.
    pub fn new(config: &LinkConfig) -> Result<Self> {
        let selectors = config
            .selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            selectors,
            path_segment: config.path_segment.clone(),
        })
    }

    /// Collect unseen detail URLs in first-seen order.
    ///
    /// Every selector candidate is applied and the results are unioned, so a
    /// link matched by several selectors appears once.
    pub fn collect(&self, document: &Html, page_url: &Url, visited: &VisitedUrls) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for selector in &self.selectors {
            for element in document.select(selector) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                let Some(absolute) = resolve_url(page_url, href) else {
                    continue;
                };
                if !self.is_detail_url(&absolute) || visited.contains(&absolute) {
                    continue;
                }
                if seen.insert(absolute.clone()) {
                    links.push(absolute);
                }
            }
        }

        log::debug!("Collected {} detail links from {}", links.len(), page_url);
        links
    }

    fn is_detail_url(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|u| {
            matches!(u.scheme(), "http" | "https") && u.path().contains(&self.path_segment)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str =
        "https://www.helloasso.com/e/recherche/associations?page=0&category_tags=bde";

    fn collector() -> LinkCollector {
        LinkCollector::new(&LinkConfig::default()).unwrap()
    }

    fn listing(anchors: &str) -> Html {
        Html::parse_document(&format!("<html><body>{anchors}</body></html>"))
    }

    const ANCHORS: &str = r#"
        <div class="association-card"><a href="/associations/bde-a">BDE A</a></div>
        <a href="https://www.helloasso.com/associations/bde-b">BDE B</a>
        <a href="/associations/bde-a">BDE A again</a>
        <a href="/e/recherche/associations?page=1">page 2</a>
        <a href="https://bde-site.fr">external</a>
        <div class="search-result"><a href="/associations/bde-c/evenements">C</a></div>
    "#;

    #[test]
    fn collects_resolved_unique_detail_links_in_order() {
        let page_url = Url::parse(LISTING).unwrap();
        let links = collector().collect(&listing(ANCHORS), &page_url, &VisitedUrls::new());
        assert_eq!(
            links,
            vec![
                "https://www.helloasso.com/associations/bde-a",
                "https://www.helloasso.com/associations/bde-b",
                "https://www.helloasso.com/associations/bde-c/evenements",
            ]
        );
    }

    #[test]
    fn duplicate_anchor_sets_collapse() {
        let page_url = Url::parse(LISTING).unwrap();
        let once = collector().collect(&listing(ANCHORS), &page_url, &VisitedUrls::new());
        let doubled = format!("{ANCHORS}{ANCHORS}");
        let twice = collector().collect(&listing(&doubled), &page_url, &VisitedUrls::new());
        assert_eq!(once, twice);
    }

    #[test]
    fn skips_visited_urls() {
        let page_url = Url::parse(LISTING).unwrap();
        let mut visited = VisitedUrls::new();
        assert!(visited.insert("https://www.helloasso.com/associations/bde-b"));
        assert!(!visited.insert("https://www.helloasso.com/associations/bde-b"));

        let links = collector().collect(&listing(ANCHORS), &page_url, &visited);
        assert_eq!(links.len(), 2);
        assert!(!links.iter().any(|l| l.ends_with("bde-b")));
    }

    #[test]
    fn empty_listing_yields_nothing() {
        let page_url = Url::parse(LISTING).unwrap();
        let links = collector().collect(&listing("<p>Aucun résultat</p>"), &page_url, &VisitedUrls::new());
        assert!(links.is_empty());
    }
}
