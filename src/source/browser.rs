// src/source/browser.rs

//! Headless Chrome page source.
//!
//! `headless_chrome` is blocking, so every fetch runs on the blocking pool
//! and is awaited immediately; pages are still rendered one at a time.

use std::ffi::OsStr;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::error::{AppError, Result};
use crate::models::ScraperConfig;
use crate::source::{PageSource, close_after};

/// Renders pages in one headless Chrome process kept for the whole run.
pub struct BrowserSource {
    browser: Browser,
    user_agent: String,
    accept_language: String,
    render_wait: Duration,
}

impl BrowserSource {
    /// Launch Chrome with the default automation fingerprints masked.
    pub fn launch(config: &ScraperConfig) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((1920, 1080)))
            .idle_browser_timeout(Duration::from_secs(config.timeout_secs.max(1) * 10))
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-notifications"),
                OsStr::new("--disable-popup-blocking"),
            ])
            .build()
            .map_err(|e| AppError::browser(format!("Failed to build Chrome launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| AppError::browser(format!("Failed to launch headless Chrome: {e}")))?;
        log::info!("Headless Chrome launched");

        Ok(Self {
            browser,
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            render_wait: Duration::from_millis(config.render_wait_ms),
        })
    }
}

#[async_trait]
impl PageSource for BrowserSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let browser = self.browser.clone();
        let user_agent = self.user_agent.clone();
        let accept_language = self.accept_language.clone();
        let render_wait = self.render_wait;
        let url = url.to_string();

        tokio::task::spawn_blocking(move || -> Result<String> {
            let tab = browser.new_tab().map_err(AppError::browser)?;
            close_after(
                &url,
                &*tab,
                |tab| render(tab, &url, &user_agent, &accept_language, render_wait),
                |tab| tab.close(true),
            )
        })
        .await
        .map_err(AppError::browser)?
    }
}

/// Load `url` in `tab` and return its DOM. The caller owns closing the tab.
fn render(
    tab: &Tab,
    url: &str,
    user_agent: &str,
    accept_language: &str,
    render_wait: Duration,
) -> Result<String> {
    tab.set_user_agent(user_agent, Some(accept_language), None)
        .map_err(AppError::browser)?;
    tab.enable_stealth_mode().map_err(AppError::browser)?;

    tab.navigate_to(url).map_err(|e| AppError::fetch(url, e))?;
    tab.wait_until_navigated()
        .map_err(|e| AppError::fetch(url, e))?;
    std::thread::sleep(render_wait);

    tab.get_content().map_err(|e| AppError::fetch(url, e))
}
