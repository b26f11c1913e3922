use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::youtube::{VideoPage, YouTubeClient, YouTubeError};

static CHANNEL_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("invalid channel id regex"));

const YOUTUBE_HOSTS: [&str; 3] = ["youtube.com", "www.youtube.com", "m.youtube.com"];

/// 用户输入的频道标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// 可以直接使用的频道 ID
    Id(String),
    /// 形如 @handle 的频道别名
    Handle(String),
    /// 旧版的 /c/<name> 自定义链接
    Custom(String),
    /// 无法识别的输入，原样作为关键词搜索
    Query(String),
}

impl ChannelRef {
    /// 解析频道链接、@handle 或频道 ID，空输入返回 None
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if CHANNEL_ID_REGEX.is_match(input) {
            return Some(Self::Id(input.to_owned()));
        }
        if input.starts_with('@') {
            return Some(Self::Handle(input.to_owned()));
        }
        let url = Url::parse(input).ok().or_else(|| {
            // 兼容省略了协议的链接，例如 youtube.com/@handle
            input
                .contains("youtube.com/")
                .then(|| Url::parse(&format!("https://{input}")).ok())
                .flatten()
        });
        let Some(url) = url else {
            return Some(Self::Query(input.to_owned()));
        };
        if !url
            .host_str()
            .is_some_and(|host| YOUTUBE_HOSTS.contains(&host.to_ascii_lowercase().as_str()))
        {
            return Some(Self::Query(input.to_owned()));
        }
        let parts = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect::<Vec<_>>())
            .unwrap_or_default();
        Some(match parts.as_slice() {
            ["channel", id, ..] => Self::Id((*id).to_owned()),
            ["c", name, ..] => Self::Custom((*name).to_owned()),
            [handle, ..] if handle.starts_with('@') && handle.len() > 1 => Self::Handle((*handle).to_owned()),
            _ => Self::Query(input.to_owned()),
        })
    }
}

/// 频道解析的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedChannel {
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// 频道的基本信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: String,
    pub title: String,
    pub video_count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    channel_id: Option<String>,
    channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    id: String,
    snippet: Option<ChannelSnippet>,
    statistics: Option<ChannelStatistics>,
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

/// 将用户输入解析为频道 ID，频道 ID 直接返回，其余情况通过搜索接口取第一个结果
pub async fn resolve_channel(client: &YouTubeClient, channel_ref: &ChannelRef) -> Result<ResolvedChannel> {
    let term = match channel_ref {
        ChannelRef::Id(channel_id) => {
            return Ok(ResolvedChannel {
                channel_id: channel_id.clone(),
                title: None,
            });
        }
        ChannelRef::Handle(term) | ChannelRef::Custom(term) | ChannelRef::Query(term) => term.as_str(),
    };
    let res = client
        .get(
            "search",
            &[("part", "snippet"), ("q", term), ("type", "channel"), ("maxResults", "1")],
        )
        .await
        .with_context(|| format!("failed to resolve channel {term}"))?;
    let list: SearchListResponse = serde_json::from_value(res)?;
    list.items
        .into_iter()
        .filter_map(|item| item.snippet)
        .find_map(|snippet| {
            Some(ResolvedChannel {
                channel_id: snippet.channel_id.filter(|id| !id.is_empty())?,
                title: snippet.channel_title,
            })
        })
        .ok_or_else(|| YouTubeError::ChannelNotFound(term.to_owned()).into())
}

pub struct Channel<'a> {
    client: &'a YouTubeClient,
    pub channel_id: String,
}

impl<'a> Channel<'a> {
    pub fn new(client: &'a YouTubeClient, channel_id: String) -> Self {
        Self { client, channel_id }
    }

    async fn get_item(&self) -> Result<ChannelItem> {
        let res = self
            .client
            .get(
                "channels",
                &[
                    ("part", "snippet,statistics,contentDetails"),
                    ("id", self.channel_id.as_str()),
                ],
            )
            .await
            .with_context(|| format!("failed to get channel {}", self.channel_id))?;
        let list: ChannelListResponse = serde_json::from_value(res)?;
        Ok(list
            .items
            .into_iter()
            .next()
            .ok_or_else(|| YouTubeError::ChannelNotFound(self.channel_id.clone()))?)
    }

    pub async fn get_info(&self) -> Result<ChannelInfo> {
        let item = self.get_item().await?;
        Ok(ChannelInfo {
            title: item.snippet.and_then(|s| s.title).unwrap_or_default(),
            video_count: item
                .statistics
                .and_then(|s| s.video_count)
                .and_then(|count| count.parse().ok())
                .unwrap_or_default(),
            id: item.id,
        })
    }

    /// 获取频道上传列表中的一页视频
    pub async fn get_videos(&self, page_token: Option<&str>) -> Result<VideoPage> {
        let item = self.get_item().await?;
        let uploads = item
            .content_details
            .and_then(|c| c.related_playlists)
            .and_then(|p| p.uploads)
            .ok_or_else(|| YouTubeError::UploadsNotFound(self.channel_id.clone()))?;
        let title = item.snippet.and_then(|s| s.title);
        self.client
            .fetch_playlist_page(&uploads, page_token, &self.channel_id, title.as_deref())
            .await
            .with_context(|| format!("failed to get uploads of channel {}", self.channel_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_ref() {
        let testcases = [
            (
                "https://www.youtube.com/channel/UCZkjWyyLvzWeoVWEpRemrDQ",
                ChannelRef::Id("UCZkjWyyLvzWeoVWEpRemrDQ".to_owned()),
            ),
            ("https://youtube.com/@vercel", ChannelRef::Handle("@vercel".to_owned())),
            ("https://m.youtube.com/@vercel/videos", ChannelRef::Handle("@vercel".to_owned())),
            ("youtube.com/@vercel", ChannelRef::Handle("@vercel".to_owned())),
            ("https://www.youtube.com/c/Vercel", ChannelRef::Custom("Vercel".to_owned())),
            ("@vercel", ChannelRef::Handle("@vercel".to_owned())),
            (
                "UCZkjWyyLvzWeoVWEpRemrDQ",
                ChannelRef::Id("UCZkjWyyLvzWeoVWEpRemrDQ".to_owned()),
            ),
            ("  vercel  ", ChannelRef::Query("vercel".to_owned())),
            (
                "https://example.com/@vercel",
                ChannelRef::Query("https://example.com/@vercel".to_owned()),
            ),
            (
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                ChannelRef::Query("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_owned()),
            ),
        ];
        for (input, expected) in testcases {
            assert_eq!(ChannelRef::parse(input), Some(expected), "input: {input}");
        }
        assert_eq!(ChannelRef::parse("   "), None);
    }
}
