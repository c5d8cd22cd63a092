//! Chrome session and element helpers.
//!
//! Clicks go through [`click`], which falls back to a DOM `click()` when the
//! synthetic mouse click is rejected (overlays, zero-size boxes).

use crate::config::Config;
use crate::{Error, Result};
use headless_chrome::{Browser, Element, LaunchOptionsBuilder, Tab};
use serde_json::{json, Value};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

const ANTI_AUTOMATION_FLAG: &str = "--disable-blink-features=AutomationControlled";

/// Long enough to outlast the login wait without DevTools traffic.
const IDLE_TIMEOUT: Duration = Duration::from_secs(900);

const IS_INTERACTABLE_JS: &str = "function() {
    const r = this.getBoundingClientRect();
    const s = window.getComputedStyle(this);
    return r.width > 0 && r.height > 0
        && s.visibility !== 'hidden' && s.display !== 'none'
        && !this.disabled;
}";

pub struct Session {
    // Dropping the browser closes Chrome.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl Session {
    pub fn launch(config: &Config) -> Result<Self> {
        let window_size = config.window_size()?;

        let options = LaunchOptionsBuilder::default()
            .headless(config.browser.headless)
            .window_size(Some(window_size))
            .idle_browser_timeout(IDLE_TIMEOUT)
            .args(vec![OsStr::new(ANTI_AUTOMATION_FLAG)])
            .build()
            .map_err(|e| Error::Browser(format!("Invalid launch options: {}", e)))?;

        let browser = Browser::new(options)?;
        let tab = browser.new_tab()?;
        tab.enable_stealth_mode()?;

        tracing::debug!(
            "Chrome launched (headless: {}, window: {}x{})",
            config.browser.headless,
            window_size.0,
            window_size.1
        );

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.tab.navigate_to(url)?.wait_until_navigated()?;
        Ok(())
    }

    pub fn go_back(&self) -> Result<()> {
        self.tab.evaluate("window.history.back()", false)?;
        Ok(())
    }

    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    pub fn press_key(&self, key: &str) -> Result<()> {
        self.tab.press_key(key)?;
        Ok(())
    }

    pub fn scroll_by(&self, dy: i64) -> Result<()> {
        self.tab.evaluate(&format!("window.scrollBy(0, {dy});"), false)?;
        Ok(())
    }

    /// All matches for `selector`; no match is an empty list, not an error.
    pub fn find_all(&self, selector: &str) -> Vec<Element<'_>> {
        self.tab.find_elements(selector).unwrap_or_default()
    }

    pub fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Element<'_>> {
        Ok(self
            .tab
            .wait_for_element_with_custom_timeout(selector, timeout)?)
    }

    pub fn close(self) {
        drop(self);
        tracing::info!("Browser closed");
    }
}

/// Visible, laid out and not disabled.
pub fn is_interactable(element: &Element<'_>) -> bool {
    element
        .call_js_fn(IS_INTERACTABLE_JS, vec![], false)
        .map(|obj| obj.value == Some(Value::Bool(true)))
        .unwrap_or(false)
}

pub fn scroll_to_center(element: &Element<'_>) -> Result<()> {
    element.call_js_fn(
        "function() { this.scrollIntoView({block: 'center'}); }",
        vec![],
        false,
    )?;
    Ok(())
}

pub fn click(element: &Element<'_>) -> Result<()> {
    if let Err(e) = element.click() {
        tracing::debug!("Mouse click failed ({}), using DOM click", e);
        element.call_js_fn("function() { this.click(); }", vec![], false)?;
    }
    Ok(())
}

pub fn clear_value(element: &Element<'_>) -> Result<()> {
    element.call_js_fn("function() { this.value = ''; }", vec![], false)?;
    Ok(())
}

/// Assign `value` directly and fire `input` so the page's bindings notice.
pub fn set_value(element: &Element<'_>, value: &str) -> Result<()> {
    element.call_js_fn(
        "function(v) {
            this.value = v;
            this.dispatchEvent(new Event('input', { bubbles: true }));
        }",
        vec![json!(value)],
        false,
    )?;
    Ok(())
}

pub fn text(element: &Element<'_>) -> Option<String> {
    element
        .get_inner_text()
        .ok()
        .map(|t| t.trim().to_string())
}

pub fn is_text_entry(element: &Element<'_>) -> bool {
    matches!(
        element.tag_name.to_ascii_lowercase().as_str(),
        "textarea" | "input"
    )
}
