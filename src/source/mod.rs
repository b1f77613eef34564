//! Page sources: how a URL becomes rendered HTML.
//!
//! - `HttpSource`: plain GET through `reqwest` (default)
//! - `BrowserSource`: headless Chrome, for pages rendered by JavaScript
//!   (requires the `browser` feature)

#[cfg(feature = "browser")]
mod browser;
mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Backend, ScraperConfig};

#[cfg(feature = "browser")]
pub use browser::BrowserSource;
pub use http::HttpSource;

/// Fetches the rendered HTML of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Return the page's HTML. Any navigation, HTTP or rendering failure is
    /// an error for this page only.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Build the page source selected by `config.backend`.
pub fn create_source(config: &ScraperConfig) -> Result<Box<dyn PageSource>> {
    match config.backend {
        Backend::Http => Ok(Box::new(HttpSource::new(config)?)),
        #[cfg(feature = "browser")]
        Backend::Browser => Ok(Box::new(BrowserSource::launch(config)?)),
        #[cfg(not(feature = "browser"))]
        Backend::Browser => Err(crate::error::AppError::config(
            "backend = \"browser\" requires building with the `browser` feature",
        )),
    }
}

/// Run `work` on `resource`, then `close` it whatever `work` returned.
///
/// A close failure is logged and does not replace the result of `work`.
#[cfg(any(feature = "browser", test))]
pub(crate) fn close_after<R: ?Sized, T, C, E: std::fmt::Display>(
    url: &str,
    resource: &R,
    work: impl FnOnce(&R) -> Result<T>,
    close: impl FnOnce(&R) -> std::result::Result<C, E>,
) -> Result<T> {
    let result = work(resource);
    if let Err(e) = close(resource) {
        log::debug!("Failed to close tab for {url}: {e}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn http_backend_builds() {
        assert!(create_source(&ScraperConfig::default()).is_ok());
    }

    #[test]
    fn tab_is_closed_when_rendering_fails() {
        let closed = std::cell::Cell::new(0);
        let result: Result<String> = close_after(
            "https://www.helloasso.com/associations/bde",
            &closed,
            |_| Err(AppError::fetch("https://www.helloasso.com/associations/bde", "timeout")),
            |closed| {
                closed.set(closed.get() + 1);
                Ok::<_, AppError>(())
            },
        );
        assert!(matches!(result, Err(AppError::Fetch { .. })));
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn close_failure_keeps_rendered_page() {
        let result = close_after(
            "https://www.helloasso.com/associations/bde",
            &(),
            |_| Ok("<html></html>".to_string()),
            |_| Err::<(), _>("target already gone"),
        );
        assert_eq!(result.unwrap(), "<html></html>");
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn browser_backend_needs_feature() {
        let config = ScraperConfig {
            backend: Backend::Browser,
            ..ScraperConfig::default()
        };
        assert!(matches!(create_source(&config), Err(AppError::Config(_))));
    }
}
