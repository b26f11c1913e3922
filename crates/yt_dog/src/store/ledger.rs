use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{JsonStorage, LEDGER_KEY, WatchedStatus};

/// 观看记录中的一条标记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub video_id: String,
    pub status: WatchedStatus,
    pub marked_at: DateTime<Utc>,
}

/// 记录每个视频被标记为已观看或已跳过的时间（毫秒时间戳），两者互斥
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WatchedLedger {
    #[serde(default)]
    watched: HashMap<String, i64>,
    #[serde(default)]
    skipped: HashMap<String, i64>,
    #[serde(skip)]
    storage: Option<JsonStorage>,
}

impl WatchedLedger {
    /// 文件不存在或已损坏时得到空的记录
    pub fn open(data_dir: &Path) -> Self {
        let storage = JsonStorage::new(data_dir, LEDGER_KEY);
        let mut ledger = match storage.load::<WatchedLedger>() {
            Ok(ledger) => ledger.unwrap_or_default(),
            Err(e) => {
                warn!("观看记录无法读取：{:#}，将使用空的记录", e);
                WatchedLedger::default()
            }
        };
        ledger.storage = Some(storage);
        ledger
    }

    fn persist(&self) -> Result<()> {
        match &self.storage {
            Some(storage) => storage.save(self).context("failed to save watched ledger"),
            None => Ok(()),
        }
    }

    pub fn mark_watched(&mut self, video_id: &str) -> Result<()> {
        self.mark_watched_at(video_id, Utc::now())
    }

    pub fn mark_skipped(&mut self, video_id: &str) -> Result<()> {
        self.mark_skipped_at(video_id, Utc::now())
    }

    fn mark_watched_at(&mut self, video_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.skipped.remove(video_id);
        self.watched.insert(video_id.to_owned(), at.timestamp_millis());
        self.persist()
    }

    fn mark_skipped_at(&mut self, video_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.watched.remove(video_id);
        self.skipped.insert(video_id.to_owned(), at.timestamp_millis());
        self.persist()
    }

    pub fn clear(&mut self, video_id: &str) -> Result<()> {
        let removed = self.watched.remove(video_id).is_some() | self.skipped.remove(video_id).is_some();
        if removed {
            self.persist()?;
        }
        Ok(())
    }

    /// 按状态更新记录，unwatched 等同于清除
    pub fn record(&mut self, video_id: &str, status: WatchedStatus) -> Result<()> {
        match status {
            WatchedStatus::Watched => self.mark_watched(video_id),
            WatchedStatus::Skipped => self.mark_skipped(video_id),
            WatchedStatus::Unwatched => self.clear(video_id),
        }
    }

    pub fn is_watched(&self, video_id: &str) -> bool {
        self.watched.contains_key(video_id)
    }

    pub fn is_skipped(&self, video_id: &str) -> bool {
        self.skipped.contains_key(video_id)
    }

    /// 所有标记，最近的在前
    pub fn history(&self) -> Vec<LedgerEntry> {
        let entries = |map: &HashMap<String, i64>, status: WatchedStatus| {
            map.iter()
                .map(move |(id, ts)| LedgerEntry {
                    video_id: id.clone(),
                    status,
                    marked_at: DateTime::from_timestamp_millis(*ts).unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                })
                .collect::<Vec<_>>()
        };
        let mut history = entries(&self.watched, WatchedStatus::Watched);
        history.extend(entries(&self.skipped, WatchedStatus::Skipped));
        history.sort_by(|a, b| {
            b.marked_at
                .cmp(&a.marked_at)
                .then_with(|| a.video_id.cmp(&b.video_id))
        });
        history
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_watched_and_skipped_are_exclusive() {
        let mut ledger = WatchedLedger::default();
        ledger.mark_watched("a").unwrap();
        assert!(ledger.is_watched("a"));
        ledger.mark_skipped("a").unwrap();
        assert!(ledger.is_skipped("a"));
        assert!(!ledger.is_watched("a"));
        ledger.mark_watched("a").unwrap();
        assert!(!ledger.is_skipped("a"));
        ledger.record("a", WatchedStatus::Unwatched).unwrap();
        assert!(!ledger.is_watched("a") && !ledger.is_skipped("a"));
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn test_history_latest_first() {
        let now = Utc::now();
        let mut ledger = WatchedLedger::default();
        ledger.mark_watched_at("old", now - Duration::hours(2)).unwrap();
        ledger.mark_skipped_at("mid", now - Duration::hours(1)).unwrap();
        ledger.mark_watched_at("new", now).unwrap();
        let history = ledger.history();
        assert_eq!(
            history.iter().map(|e| e.video_id.as_str()).collect::<Vec<_>>(),
            ["new", "mid", "old"]
        );
        assert_eq!(history[1].status, WatchedStatus::Skipped);
        assert_eq!(history[0].marked_at.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_persistence_and_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = WatchedLedger::open(dir.path());
        ledger.mark_watched("a").unwrap();
        ledger.mark_skipped("b").unwrap();
        let reopened = WatchedLedger::open(dir.path());
        assert!(reopened.is_watched("a"));
        assert!(reopened.is_skipped("b"));
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("yt-dog-state.json")).unwrap()).unwrap();
        assert!(raw["watched"]["a"].is_i64());

        std::fs::write(dir.path().join("yt-dog-state.json"), "{broken").unwrap();
        let corrupt = WatchedLedger::open(dir.path());
        assert!(corrupt.history().is_empty());
    }

    #[test]
    fn test_save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = WatchedLedger::open(dir.path());
        std::fs::create_dir(dir.path().join("yt-dog-state.json.tmp")).unwrap();
        assert!(ledger.mark_watched("a").is_err());
        assert!(ledger.record("b", WatchedStatus::Skipped).is_err());
        assert!(WatchedLedger::open(dir.path()).history().is_empty());
    }
}
