use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

mod ledger;
mod model;
mod storage;

pub use ledger::{LedgerEntry, WatchedLedger};
pub use model::{ChannelState, VideoState, WatchedStatus};
pub use storage::{JsonStorage, LEDGER_KEY, STORE_KEY};

use crate::youtube::VideoInfo;

/// visible 每页展示的视频数量
pub const PAGE_SIZE: usize = 10;
const SUGGESTION_COUNT: usize = 10;

/// 一次合并的结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub updated: usize,
}

/// 保存已添加的频道以及每个频道下的视频
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(default)]
    channels: Vec<ChannelState>,
    #[serde(default)]
    videos_by_channel: HashMap<String, Vec<VideoState>>,
    /// 仅在同步过程中为 true，不会被持久化
    #[serde(skip)]
    is_fetching: bool,
    #[serde(skip)]
    storage: Option<JsonStorage>,
}

impl Store {
    /// 从数据目录加载，文件不存在时得到空的 Store
    pub fn open(data_dir: &Path) -> Result<Self> {
        let storage = JsonStorage::new(data_dir, STORE_KEY);
        let mut store = storage.load::<Store>()?.unwrap_or_default();
        debug!(
            "从 {} 加载了 {} 个频道",
            storage.path().display(),
            store.channels.len()
        );
        store.storage = Some(storage);
        Ok(store)
    }

    fn persist(&self) -> Result<()> {
        match &self.storage {
            Some(storage) => storage.save(self).context("failed to save channel store"),
            None => Ok(()),
        }
    }

    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    /// 频道已存在时不做任何修改，返回 false
    pub fn add_channel(&mut self, channel: ChannelState) -> Result<bool> {
        if self.channels.iter().any(|c| c.id == channel.id) {
            return Ok(false);
        }
        self.channels.push(channel);
        self.persist()?;
        Ok(true)
    }

    /// 更新频道的标题与视频数量，为 None 的字段保持不变
    pub fn refresh_channel(&mut self, channel_id: &str, title: Option<String>, video_count: Option<u64>) -> Result<bool> {
        let Some(channel) = self.channels.iter_mut().find(|c| c.id == channel_id) else {
            return Ok(false);
        };
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            channel.title = Some(title);
        }
        if let Some(video_count) = video_count {
            channel.video_count = Some(video_count);
        }
        self.persist()?;
        Ok(true)
    }

    /// 按视频 id 合并，已有视频除观看状态外的字段全部被覆盖，新视频追加到末尾
    pub fn set_videos(&mut self, channel_id: &str, videos: Vec<VideoInfo>) -> Result<MergeSummary> {
        let existing = self.videos_by_channel.entry(channel_id.to_owned()).or_default();
        let mut index = existing
            .iter()
            .enumerate()
            .map(|(idx, v)| (v.info.id.clone(), idx))
            .collect::<HashMap<_, _>>();
        let mut summary = MergeSummary::default();
        for video in videos {
            match index.get(&video.id) {
                Some(&idx) => {
                    existing[idx].info = video;
                    summary.updated += 1;
                }
                None => {
                    index.insert(video.id.clone(), existing.len());
                    existing.push(VideoState::from(video));
                    summary.added += 1;
                }
            }
        }
        self.persist()?;
        Ok(summary)
    }

    /// 视频不存在时返回 false
    pub fn mark_status(&mut self, channel_id: &str, video_id: &str, status: WatchedStatus) -> Result<bool> {
        let Some(video) = self
            .videos_by_channel
            .get_mut(channel_id)
            .and_then(|videos| videos.iter_mut().find(|v| v.info.id == video_id))
        else {
            return Ok(false);
        };
        video.status = status;
        self.persist()?;
        Ok(true)
    }

    /// 根据频道 id、添加时的输入或标题查找频道
    pub fn find_channel(&self, key: &str) -> Option<&ChannelState> {
        let key = key.trim();
        self.channels
            .iter()
            .find(|c| c.id == key)
            .or_else(|| self.channels.iter().find(|c| c.url == key))
            .or_else(|| {
                self.channels
                    .iter()
                    .find(|c| c.title.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(key)))
            })
    }

    pub fn videos(&self, channel_id: &str) -> &[VideoState] {
        self.videos_by_channel.get(channel_id).map_or(&[], Vec::as_slice)
    }

    pub fn find_video(&self, channel_id: &str, video_id: &str) -> Option<&VideoState> {
        self.videos(channel_id).iter().find(|v| v.info.id == video_id)
    }

    fn newest_first<'a>(&'a self, channel_id: &str, filter: impl Fn(&VideoState) -> bool) -> Vec<&'a VideoState> {
        let mut videos = self.videos(channel_id).iter().filter(|v| filter(v)).collect::<Vec<_>>();
        videos.sort_by(|a, b| b.info.published_at.cmp(&a.info.published_at));
        videos
    }

    /// 未观看（包括跳过）的视频，按发布时间倒序，展示前 page + 1 页
    pub fn visible(&self, channel_id: &str, page: usize) -> Vec<&VideoState> {
        let mut videos = self.newest_first(channel_id, |v| v.status != WatchedStatus::Watched);
        videos.truncate(PAGE_SIZE.saturating_mul(page.saturating_add(1)));
        videos
    }

    /// 最新的若干个既未观看也未跳过的视频
    pub fn suggestions(&self, channel_id: &str) -> Vec<&VideoState> {
        let mut videos = self.newest_first(channel_id, |v| v.status == WatchedStatus::Unwatched);
        videos.truncate(SUGGESTION_COUNT);
        videos
    }

    pub fn unwatched_count(&self, channel_id: &str) -> usize {
        self.videos(channel_id)
            .iter()
            .filter(|v| v.status == WatchedStatus::Unwatched)
            .count()
    }

    pub fn set_fetching(&mut self, is_fetching: bool) {
        self.is_fetching = is_fetching;
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }
}
