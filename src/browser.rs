use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// The original's implicit wait for element appearance
const DEFAULT_ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// One headless browser session, scoped to a single monitoring run. The
/// Chrome process is owned by this struct and terminated on drop, which
/// covers every exit path of a run.
pub struct PageSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl PageSession {
    pub fn launch(chrome_path: Option<&str>) -> Result<Self> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .window_size(Some((1920, 1080)))
            .args(vec![
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--lang=he-IL"),
                OsStr::new("--blink-settings=imagesEnabled=false"),
                OsStr::new("--disable-notifications"),
            ])
            .build()
            .map_err(|e| AppError::Browser(format!("Failed to create launch options: {}", e)))?;

        if let Some(path) = chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(path));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| AppError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AppError::Browser(format!("Failed to create tab: {}", e)))?;

        tab.set_user_agent(USER_AGENT, Some("he-IL"), None)
            .map_err(|e| AppError::Browser(format!("Failed to set user agent: {}", e)))?;
        tab.set_default_timeout(DEFAULT_ELEMENT_TIMEOUT);

        Ok(PageSession {
            _browser: browser,
            tab,
        })
    }

    pub fn open(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| AppError::Scraping(format!("Navigation failed: {}", e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| AppError::Scraping(format!("Page load failed: {}", e)))?;
        Ok(())
    }

    /// Bounded wait for the first selector that turns up an element;
    /// returns its rendered text. Each candidate gets the full timeout in
    /// turn, and a page with none of them simply yields nothing.
    pub fn wait_for_any(&self, selectors: &[&str], timeout: Duration) -> Option<String> {
        for selector in selectors {
            match self
                .tab
                .wait_for_element_with_custom_timeout(selector, timeout)
            {
                Ok(element) => {
                    if let Ok(text) = element.get_inner_text() {
                        debug!("Found element text via {}: {}", selector, text);
                        return Some(text);
                    }
                }
                Err(_) => continue,
            }
        }

        None
    }

    /// Rendered page markup, after scripts have run.
    pub fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| AppError::Scraping(format!("Failed to get page content: {}", e)))
    }
}
