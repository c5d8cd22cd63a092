//! Delivered-set record: posting ids already greeted today.
//!
//! Stored as `{ "date": "YYYY-MM-DD", "jobs": [...] }`. A record stamped with
//! any other date loads as empty, so the set resets every calendar day.

use crate::Result;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_RECORD_PATH: &str = "delivered.json";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordFile {
    #[serde(default)]
    date: String,
    #[serde(default)]
    jobs: Vec<String>,
}

#[derive(Debug)]
pub struct DeliveredSet {
    path: PathBuf,
    jobs: Vec<String>,
}

impl DeliveredSet {
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Load the record at `path`, keeping its ids only if it is stamped `today`.
    ///
    /// A missing file yields an empty set. A file that cannot be read or
    /// parsed is logged and treated as empty; it is replaced on the next save.
    pub fn load(path: impl Into<PathBuf>, today: NaiveDate) -> Self {
        let path = path.into();
        let jobs = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<RecordFile>(&text) {
                Ok(file) if file.date == today.format(DATE_FORMAT).to_string() => file.jobs,
                Ok(file) => {
                    tracing::debug!("Discarding delivered record from {}", file.date);
                    Vec::new()
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable record {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!("Cannot read record {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Self { path, jobs }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.jobs.iter().any(|j| j == id)
    }

    /// Append `id` and rewrite the record immediately.
    ///
    /// Does not dedupe: callers check [`contains`](Self::contains) first.
    pub fn record(&mut self, id: impl Into<String>) -> Result<()> {
        self.record_on(id, Self::today())
    }

    /// [`record`](Self::record), stamping the file with `date`.
    pub fn record_on(&mut self, id: impl Into<String>, date: NaiveDate) -> Result<()> {
        self.jobs.push(id.into());
        self.save_on(date)
    }

    /// Rewrite the record stamped with `date`, the day of the write.
    pub fn save_on(&self, date: NaiveDate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = RecordFile {
            date: date.format(DATE_FORMAT).to_string(),
            jobs: self.jobs.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(std::io::Error::from)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn ids(&self) -> &[String] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let set = DeliveredSet::load(dir.path().join("delivered.json"), day("2026-10-18"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_other_date_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivered.json");
        std::fs::write(&path, r#"{"date": "2026-10-17", "jobs": ["a1", "b2"]}"#).unwrap();

        let set = DeliveredSet::load(&path, day("2026-10-18"));

        assert!(set.is_empty());
        assert!(!set.contains("a1"));
    }

    #[test]
    fn test_same_date_keeps_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivered.json");
        std::fs::write(&path, r#"{"date": "2026-10-18", "jobs": ["a1", "b2"]}"#).unwrap();

        let set = DeliveredSet::load(&path, day("2026-10-18"));

        assert_eq!(set.ids(), ["a1", "b2"]);
        assert!(set.contains("b2"));
    }

    #[test]
    fn test_record_round_trips_same_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivered.json");
        let today = day("2026-10-18");

        let mut set = DeliveredSet::load(&path, today);
        set.record_on("7f3c2e", today).unwrap();
        set.record_on("招聘-42", today).unwrap();

        let reloaded = DeliveredSet::load(&path, today);
        assert_eq!(reloaded.ids(), ["7f3c2e", "招聘-42"]);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"date\": \"2026-10-18\""));
        assert!(raw.contains("招聘-42"));
    }

    #[test]
    fn test_record_keeps_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivered.json");
        let today = day("2026-10-18");

        let mut set = DeliveredSet::load(&path, today);
        set.record_on("same", today).unwrap();
        set.record_on("same", today).unwrap();

        let reloaded = DeliveredSet::load(&path, today);
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_unreadable_record_is_empty_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivered.json");
        std::fs::write(&path, "not json").unwrap();
        let today = day("2026-10-18");

        let mut set = DeliveredSet::load(&path, today);
        assert!(set.is_empty());

        set.record_on("x9", today).unwrap();
        assert_eq!(DeliveredSet::load(&path, today).ids(), ["x9"]);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("delivered.json");

        let mut set = DeliveredSet::load(&path, day("2026-10-18"));
        set.record("abc").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_save_stamps_write_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivered.json");

        let mut set = DeliveredSet::load(&path, day("2026-10-18"));
        set.record_on("before", day("2026-10-18")).unwrap();
        // run carries on past midnight
        set.record_on("after", day("2026-10-19")).unwrap();

        let next_run = DeliveredSet::load(&path, day("2026-10-19"));
        assert_eq!(next_run.ids(), ["before", "after"]);
    }

    #[test]
    fn test_unreadable_path_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be
        let set = DeliveredSet::load(dir.path(), day("2026-10-18"));
        assert!(set.is_empty());
    }
}
