//! Service layer for the scraper.
//!
//! This module contains the page-level logic:
//! - Record extraction from detail pages (`RecordExtractor`)
//! - Detail link collection from listing pages (`LinkCollector`)
//! - Post-processing of raw output (`RecordCleaner`)
//! - Pagination inspection (`PaginationInspector`)

mod cleaner;
mod extractor;
mod links;
mod pagination;

pub use cleaner::RecordCleaner;
pub use extractor::RecordExtractor;
pub use links::{LinkCollector, VisitedUrls};
pub use pagination::{PaginationHints, PaginationInspector};
