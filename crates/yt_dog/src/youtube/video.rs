use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::youtube::YouTubeClient;

pub(super) const NO_THUMBNAIL: &str = "https://i.ytimg.com/img/no_thumbnail.jpg";

/// 代理层返回给客户端的视频信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub thumbnail: String,
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    /// 单位为秒，获取失败时为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// 一页视频以及用于获取下一页的 continuation token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub videos: Vec<VideoInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaylistItem {
    pub content_details: Option<PlaylistItemContentDetails>,
    pub snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaylistItemContentDetails {
    pub video_id: Option<String>,
    pub video_published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaylistItemSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnails: Option<Thumbnails>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Thumbnails {
    pub medium: Option<Thumbnail>,
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

impl PlaylistItem {
    /// 没有视频 id 的条目直接丢弃；channel_title 优先使用频道本身的标题
    pub(super) fn into_video_info(self, channel_id: &str, channel_title: Option<&str>) -> Option<VideoInfo> {
        let content_details = self.content_details?;
        let id = content_details.video_id.filter(|id| !id.is_empty())?;
        let snippet = self.snippet;
        let published_at = content_details
            .video_published_at
            .or_else(|| snippet.as_ref().and_then(|s| s.published_at))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let (title, description, thumbnail, item_channel_id, item_channel_title) = match snippet {
            Some(snippet) => (
                snippet.title,
                snippet.description,
                snippet.thumbnails.and_then(|t| t.medium.or(t.default)).map(|t| t.url),
                snippet.channel_id,
                snippet.channel_title,
            ),
            None => (None, None, None, None, None),
        };
        Some(VideoInfo {
            id,
            title: title.unwrap_or_default(),
            description,
            published_at,
            thumbnail: thumbnail.unwrap_or_else(|| NO_THUMBNAIL.to_owned()),
            channel_id: item_channel_id.unwrap_or_else(|| channel_id.to_owned()),
            channel_title: channel_title
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .or(item_channel_title)
                .unwrap_or_default(),
            duration: None,
        })
    }
}

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").expect("invalid duration regex")
});

/// 解析 ISO 8601 格式的时长（如 PT1H2M3S、P1DT2S），返回总秒数
pub fn parse_iso8601_duration(duration: &str) -> Option<u64> {
    if duration == "P" || duration.ends_with('T') {
        return None;
    }
    let captures = DURATION_REGEX.captures(duration)?;
    let part = |idx: usize| -> Option<u64> {
        captures
            .get(idx)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };
    // 超出 u64 范围的时长视为无法解析
    [(1, 86400), (2, 3600), (3, 60), (4, 1)]
        .into_iter()
        .try_fold(0u64, |total, (idx, unit)| total.checked_add(part(idx)?.checked_mul(unit)?))
}

impl YouTubeClient {
    /// 批量获取视频时长，失败时返回空表，由调用方决定如何展示
    pub(super) async fn fetch_durations(&self, ids: &[&str]) -> HashMap<String, u64> {
        if ids.is_empty() {
            return HashMap::new();
        }
        let ids = ids.join(",");
        let res = async {
            let res = self
                .get("videos", &[("part", "contentDetails"), ("id", ids.as_str())])
                .await?;
            Ok::<_, anyhow::Error>(serde_json::from_value::<VideoListResponse>(res)?)
        }
        .await;
        match res {
            Ok(list) => list
                .items
                .into_iter()
                .filter_map(|item| {
                    let duration = item.content_details?.duration?;
                    Some((item.id, parse_iso8601_duration(&duration)?))
                })
                .collect(),
            Err(e) => {
                warn!("获取视频时长失败：{:#}，本页视频将不包含时长", e);
                HashMap::new()
            }
        }
    }

    /// 获取上传列表中的一页视频，并补充时长信息
    pub(super) async fn fetch_playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        channel_id: &str,
        channel_title: Option<&str>,
    ) -> Result<VideoPage> {
        let page_size = self.page_size.to_string();
        let mut query = vec![
            ("part", "contentDetails,snippet"),
            ("playlistId", playlist_id),
            ("maxResults", page_size.as_str()),
        ];
        if let Some(page_token) = page_token.filter(|t| !t.is_empty()) {
            query.push(("pageToken", page_token));
        }
        let res = self.get("playlistItems", &query).await?;
        let list: PlaylistItemListResponse = serde_json::from_value(res)?;
        let mut videos = list
            .items
            .into_iter()
            .filter_map(|item| item.into_video_info(channel_id, channel_title))
            .collect::<Vec<_>>();
        let durations = self
            .fetch_durations(&videos.iter().map(|v| v.id.as_str()).collect::<Vec<_>>())
            .await;
        for video in videos.iter_mut() {
            video.duration = durations.get(&video.id).copied();
        }
        Ok(VideoPage {
            videos,
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_iso8601_duration() {
        let testcases = [
            ("PT1H2M3S", Some(3723)),
            ("PT4M5S", Some(245)),
            ("PT59S", Some(59)),
            ("PT2H", Some(7200)),
            ("P1DT1S", Some(86401)),
            ("P0D", Some(0)),
            ("PT18446744073709551615S", Some(u64::MAX)),
            ("P999999999999999D", None),
            ("PT9999999999999999H", None),
            ("PT1M18446744073709551615S", None),
            ("PT99999999999999999999S", None),
            ("PT", None),
            ("1H2M", None),
            ("", None),
        ];
        for (input, expected) in testcases {
            assert_eq!(parse_iso8601_duration(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_playlist_item_into_video_info() {
        let item: PlaylistItem = serde_json::from_value(json!({
            "contentDetails": {"videoId": "abc", "videoPublishedAt": "2024-05-01T10:00:00Z"},
            "snippet": {
                "title": "Hello",
                "description": "desc",
                "publishedAt": "2024-05-02T10:00:00Z",
                "thumbnails": {"default": {"url": "https://i.ytimg.com/vi/abc/default.jpg"}},
                "channelTitle": "Item Title"
            }
        }))
        .unwrap();
        let video = item.into_video_info("UC1", Some("Channel Title")).unwrap();
        assert_eq!(video.id, "abc");
        assert_eq!(video.channel_id, "UC1");
        assert_eq!(video.channel_title, "Channel Title");
        assert_eq!(video.thumbnail, "https://i.ytimg.com/vi/abc/default.jpg");
        assert_eq!(video.published_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_playlist_item_fallbacks() {
        let no_id: PlaylistItem = serde_json::from_value(json!({"snippet": {"title": "x"}})).unwrap();
        assert!(no_id.into_video_info("UC1", None).is_none());
        let bare: PlaylistItem = serde_json::from_value(json!({
            "contentDetails": {"videoId": "def"},
            "snippet": {"channelTitle": "From Item"}
        }))
        .unwrap();
        let video = bare.into_video_info("UC1", None).unwrap();
        assert_eq!(video.thumbnail, NO_THUMBNAIL);
        assert_eq!(video.published_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(video.channel_title, "From Item");
        assert_eq!(video.title, "");
    }
}
