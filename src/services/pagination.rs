//! Pagination analysis for listing pages.
//!
//! The source site's pagination is undocumented, so this inspects a
//! rendered listing the way an operator would: numbered controls and an
//! enabled "next" control.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::parse_selector;
use crate::utils::normalize_whitespace;

/// Words that identify a "next page" control, in its text or aria-label.
const NEXT_WORDS: [&str; 2] = ["suivant", "next"];

/// Arrow glyphs used as the whole label of a "next page" control.
const NEXT_ARROWS: [&str; 3] = [">", "›", "»"];

/// What the pagination controls of one listing page say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationHints {
    pub max_page_label: Option<u32>,
    pub has_next: bool,
}

/// Reads pagination controls from listing pages.
pub struct PaginationInspector {
    controls: Selector,
}

impl PaginationInspector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            controls: parse_selector("button, a")?,
        })
    }

    pub fn inspect(&self, document: &Html) -> PaginationHints {
        let mut hints = PaginationHints::default();

        for control in document.select(&self.controls) {
            let label = normalize_whitespace(&control.text().collect::<String>());
            if let Ok(number) = label.parse::<u32>() {
                hints.max_page_label = hints.max_page_label.max(Some(number));
                continue;
            }

            let lower = label.to_lowercase();
            let aria = control
                .value()
                .attr("aria-label")
                .map(str::to_lowercase)
                .unwrap_or_default();
            let is_next = NEXT_ARROWS.contains(&lower.as_str())
                || NEXT_WORDS
                    .iter()
                    .any(|w| lower.contains(w) || aria.contains(w));
            if is_next && !Self::is_disabled(&control) {
                hints.has_next = true;
            }
        }

        hints
    }

    fn is_disabled(control: &ElementRef) -> bool {
        let el = control.value();
        el.attr("disabled").is_some()
            || el.attr("aria-disabled") == Some("true")
            || el.classes().any(|c| c.contains("disabled"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspect(body: &str) -> PaginationHints {
        let doc = Html::parse_document(&format!("<html><body>{body}</body></html>"));
        PaginationInspector::new().unwrap().inspect(&doc)
    }

    #[test]
    fn reads_largest_page_number_and_next() {
        let hints = inspect(
            r#"<nav><a>1</a><a>2</a><button> 30 </button><button>Suivant</button></nav>"#,
        );
        assert_eq!(hints.max_page_label, Some(30));
        assert!(hints.has_next);
    }

    #[test]
    fn disabled_next_is_ignored() {
        let hints = inspect(r#"<button disabled>Suivant</button><a aria-label="Next page" aria-disabled="true">›</a>"#);
        assert_eq!(hints, PaginationHints::default());
    }

    #[test]
    fn aria_label_marks_next_control() {
        let hints = inspect(r#"<a href="?page=2" aria-label="Page suivante">›</a>"#);
        assert!(hints.has_next);
    }

    #[test]
    fn no_controls() {
        assert_eq!(inspect("<p>1</p>"), PaginationHints::default());
    }
}
