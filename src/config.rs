//! Run configuration.
//!
//! Keys are accepted in English snake_case or under the Chinese names used by
//! earlier config files, e.g. `"投递配置": { "每日上限": 50 }`.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.zhipin.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(alias = "浏览器配置")]
    pub browser: BrowserConfig,
    #[serde(alias = "搜索配置")]
    pub search: SearchConfig,
    #[serde(alias = "投递配置")]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub timing: Timing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(alias = "无头模式")]
    pub headless: bool,
    /// Chrome window size as `"W,H"` (or `"WxH"`).
    #[serde(alias = "窗口大小")]
    pub window_size: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(alias = "关键词")]
    pub keyword: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    #[serde(alias = "招呼语")]
    pub greeting: String,
    /// Lower bound of the random pause between attempts, in seconds.
    #[serde(alias = "最小间隔秒数")]
    pub min_delay: f64,
    #[serde(alias = "最大间隔秒数")]
    pub max_delay: f64,
    #[serde(alias = "每日上限")]
    pub daily_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Fixed waits and bounds, in seconds unless noted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub login_poll: u64,
    pub login_timeout: u64,
    pub login_reminder: u64,
    pub search_settle: u64,
    pub listing_settle: u64,
    pub listing_wait: u64,
    pub match_settle: u64,
    pub scroll_settle: u64,
    pub extra_delay: u64,
    pub close_delay: u64,
    /// Consecutive non-success outcomes before the run stops.
    pub max_failures: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            login_poll: 5,
            login_timeout: 300,
            login_reminder: 30,
            search_settle: 8,
            listing_settle: 6,
            listing_wait: 25,
            match_settle: 3,
            scroll_settle: 5,
            extra_delay: 2,
            close_delay: 10,
            max_failures: 5,
        }
    }
}

impl Timing {
    pub fn login_poll(&self) -> Duration {
        Duration::from_secs(self.login_poll)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout)
    }

    pub fn login_reminder(&self) -> Duration {
        Duration::from_secs(self.login_reminder)
    }
}

impl Config {
    /// Read and validate the config file. A missing file is reported as
    /// [`Error::ConfigMissing`] so the caller can exit before launching Chrome.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigMissing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.window_size()?;

        let d = &self.delivery;
        if !(d.min_delay.is_finite() && d.max_delay.is_finite()) || d.min_delay < 0.0 {
            return Err(Error::ConfigInvalid(format!(
                "delays must be non-negative numbers, got {}..{}",
                d.min_delay, d.max_delay
            )));
        }
        if Duration::try_from_secs_f64(d.max_delay).is_err() {
            return Err(Error::ConfigInvalid(format!(
                "max_delay ({}) is out of range",
                d.max_delay
            )));
        }
        if d.min_delay > d.max_delay {
            return Err(Error::ConfigInvalid(format!(
                "min_delay ({}) exceeds max_delay ({})",
                d.min_delay, d.max_delay
            )));
        }
        if d.daily_limit == 0 {
            return Err(Error::ConfigInvalid("daily_limit must be at least 1".into()));
        }
        if d.greeting.trim().is_empty() {
            return Err(Error::ConfigInvalid("greeting is empty".into()));
        }
        if self.search.keyword.trim().is_empty() {
            return Err(Error::ConfigInvalid("search keyword is empty".into()));
        }
        if self.timing.login_poll == 0 {
            return Err(Error::ConfigInvalid("login_poll must be at least 1s".into()));
        }
        if self.timing.max_failures == 0 {
            return Err(Error::ConfigInvalid("max_failures must be at least 1".into()));
        }
        Ok(())
    }

    pub fn window_size(&self) -> Result<(u32, u32)> {
        parse_window_size(&self.browser.window_size)
    }
}

pub fn parse_window_size(raw: &str) -> Result<(u32, u32)> {
    let invalid = || Error::ConfigInvalid(format!("window size '{raw}' is not W,H"));

    let (w, h) = raw
        .split_once(',')
        .or_else(|| raw.split_once(['x', 'X']))
        .ok_or_else(invalid)?;
    let w: u32 = w.trim().parse().map_err(|_| invalid())?;
    let h: u32 = h.trim().parse().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str = r#"{
        "browser": { "headless": false, "window_size": "1920,1080" },
        "search": { "keyword": "rust" },
        "delivery": {
            "greeting": "Hello, I am interested in this role.",
            "min_delay": 3,
            "max_delay": 6.5,
            "daily_limit": 40
        }
    }"#;

    #[test]
    fn test_parse_english_keys_with_defaults() {
        let config = Config::from_json(ENGLISH).unwrap();

        assert!(!config.browser.headless);
        assert_eq!(config.search.keyword, "rust");
        assert_eq!(config.delivery.daily_limit, 40);
        assert_eq!(config.delivery.max_delay, 6.5);
        assert_eq!(config.site.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timing.login_timeout, 300);
        assert_eq!(config.timing.max_failures, 5);
        assert_eq!(config.window_size().unwrap(), (1920, 1080));
    }

    #[test]
    fn test_parse_chinese_keys() {
        let json = r#"{
            "浏览器配置": { "无头模式": true, "窗口大小": "1280,800" },
            "搜索配置": { "关键词": "后端开发" },
            "投递配置": {
                "招呼语": "您好，我对这个岗位很感兴趣",
                "最小间隔秒数": 5,
                "最大间隔秒数": 10,
                "每日上限": 100
            }
        }"#;

        let config = Config::from_json(json).unwrap();

        assert!(config.browser.headless);
        assert_eq!(config.search.keyword, "后端开发");
        assert_eq!(config.delivery.greeting, "您好，我对这个岗位很感兴趣");
        assert_eq!(config.delivery.min_delay, 5.0);
        assert_eq!(config.delivery.daily_limit, 100);
    }

    #[test]
    fn test_timing_overrides_are_partial() {
        let json = ENGLISH.replacen(
            "\"search\"",
            "\"timing\": { \"login_timeout\": 60, \"max_failures\": 3 }, \"search\"",
            1,
        );

        let config = Config::from_json(&json).unwrap();

        assert_eq!(config.timing.login_timeout, 60);
        assert_eq!(config.timing.max_failures, 3);
        assert_eq!(config.timing.login_poll, 5);
    }

    #[test]
    fn test_rejects_inverted_delays() {
        let json = ENGLISH.replace("\"min_delay\": 3", "\"min_delay\": 9");
        let err = Config::from_json(&json).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
    }

    #[test]
    fn test_rejects_delay_too_large_for_duration() {
        let json = ENGLISH
            .replace("\"min_delay\": 3", "\"min_delay\": 1e20")
            .replace("\"max_delay\": 6.5", "\"max_delay\": 1e20");
        assert!(matches!(
            Config::from_json(&json),
            Err(Error::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_rejects_zero_daily_limit() {
        let json = ENGLISH.replace("\"daily_limit\": 40", "\"daily_limit\": 0");
        assert!(matches!(
            Config::from_json(&json),
            Err(Error::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let err = Config::from_json(r#"{ "browser": { "headless": true, "window_size": "1,1" } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = Config::load(&path).unwrap_err();

        assert!(matches!(err, Error::ConfigMissing(p) if p == path));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, ENGLISH).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.delivery.daily_limit, 40);
    }

    #[test]
    fn test_parse_window_size() {
        assert_eq!(parse_window_size("1920,1080").unwrap(), (1920, 1080));
        assert_eq!(parse_window_size(" 800 , 600 ").unwrap(), (800, 600));
        assert_eq!(parse_window_size("1366x768").unwrap(), (1366, 768));
        assert!(parse_window_size("1920").is_err());
        assert!(parse_window_size("0,600").is_err());
        assert!(parse_window_size("wide,tall").is_err());
    }
}
