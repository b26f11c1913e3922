use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::youtube::{ChannelInfo, VideoInfo};

/// 视频的观看状态，同一时刻只能处于其中一种
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WatchedStatus {
    #[default]
    Unwatched,
    Watched,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelState {
    pub id: String,
    /// 添加频道时用户的原始输入
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<u64>,
    pub added_at: DateTime<Utc>,
}

impl ChannelState {
    pub fn new(id: String, url: String, title: Option<String>) -> Self {
        Self {
            id,
            url,
            title: title.filter(|t| !t.is_empty()),
            video_count: None,
            added_at: Utc::now(),
        }
    }

    pub fn with_info(mut self, info: Option<&ChannelInfo>) -> Self {
        if let Some(info) = info {
            self.title = Some(info.title.clone()).filter(|t| !t.is_empty()).or(self.title);
            self.video_count = Some(info.video_count);
        }
        self
    }

    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoState {
    #[serde(flatten)]
    pub info: VideoInfo,
    #[serde(default)]
    pub status: WatchedStatus,
}

impl From<VideoInfo> for VideoState {
    fn from(info: VideoInfo) -> Self {
        Self {
            info,
            status: WatchedStatus::Unwatched,
        }
    }
}
