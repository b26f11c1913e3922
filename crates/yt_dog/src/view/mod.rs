use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::store::{ChannelState, LedgerEntry, VideoState, WatchedStatus};

pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}")
}

/// 时长为空或为 0 时返回空字符串
pub fn format_duration(seconds: Option<u64>) -> String {
    match seconds {
        None | Some(0) => String::new(),
        Some(seconds) => {
            let (h, m, s) = (seconds / 3600, seconds % 3600 / 60, seconds % 60);
            if h > 0 {
                format!("{h}:{m:02}:{s:02}")
            } else {
                format!("{m}:{s:02}")
            }
        }
    }
}

/// 形如 "3 days ago" 的相对时间
pub fn format_relative(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - time).num_seconds();
    if seconds < 60 {
        return "just now".to_owned();
    }
    let (value, unit) = [
        (60 * 60 * 24 * 365, "year"),
        (60 * 60 * 24 * 30, "month"),
        (60 * 60 * 24 * 7, "week"),
        (60 * 60 * 24, "day"),
        (60 * 60, "hour"),
        (60, "minute"),
    ]
    .into_iter()
    .find_map(|(size, unit)| (seconds >= size).then_some((seconds / size, unit)))
    .unwrap_or((1, "minute"));
    format!("{value} {unit}{} ago", if value == 1 { "" } else { "s" })
}

fn status_tag(status: WatchedStatus) -> &'static str {
    match status {
        WatchedStatus::Unwatched => "[ ]",
        WatchedStatus::Watched => "[x]",
        WatchedStatus::Skipped => "[-]",
    }
}

pub fn render_video_card(video: &VideoState, now: DateTime<Utc>) -> String {
    let info = &video.info;
    let mut meta = vec![format_relative(info.published_at, now)];
    let duration = format_duration(info.duration);
    if !duration.is_empty() {
        meta.push(duration);
    }
    meta.push(video.status.to_string());
    format!(
        "{} {}  {}\n    {}  {}",
        status_tag(video.status),
        info.id,
        info.title,
        meta.join(" · "),
        embed_url(&info.id)
    )
}

pub fn render_channel_line(channel: &ChannelState, unwatched: usize) -> String {
    let count = channel
        .video_count
        .map_or_else(|| "? videos".to_owned(), |count| format!("{count} videos"));
    format!(
        "{}  {}  {}, {} unwatched, added {}",
        channel.id,
        channel.display_name(),
        count,
        unwatched,
        channel.added_at.format("%Y-%m-%d")
    )
}

pub fn render_history_line(entry: &LedgerEntry, title: Option<&str>, now: DateTime<Utc>) -> String {
    format!(
        "{:<9} {}  {}{}",
        entry.status.to_string(),
        format_relative(entry.marked_at, now),
        entry.video_id,
        title.map(|t| format!("  {t}")).unwrap_or_default()
    )
}

/// 在默认浏览器中打开嵌入式播放器
pub fn open_player(video_id: &str) -> Result<String> {
    let url = embed_url(video_id);
    webbrowser::open(&url).with_context(|| format!("failed to open {url} in browser"))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::store::tests::video;

    #[test]
    fn test_format_duration() {
        let testcases = [
            (None, ""),
            (Some(0), ""),
            (Some(5), "0:05"),
            (Some(65), "1:05"),
            (Some(3599), "59:59"),
            (Some(3723), "1:02:03"),
            (Some(90061), "25:01:01"),
        ];
        for (input, expected) in testcases {
            assert_eq!(format_duration(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_format_relative() {
        let now = Utc::now();
        let testcases = [
            (Duration::seconds(10), "just now"),
            (Duration::minutes(1), "1 minute ago"),
            (Duration::hours(5), "5 hours ago"),
            (Duration::days(3), "3 days ago"),
            (Duration::days(14), "2 weeks ago"),
            (Duration::days(65), "2 months ago"),
            (Duration::days(400), "1 year ago"),
            (Duration::seconds(-30), "just now"),
        ];
        for (delta, expected) in testcases {
            assert_eq!(format_relative(now - delta, now), expected);
        }
    }

    #[test]
    fn test_render_video_card() {
        let mut state = VideoState::from(video("abc", 3));
        state.status = WatchedStatus::Skipped;
        let now = state.info.published_at + Duration::days(3);
        let card = render_video_card(&state, now);
        assert!(card.starts_with("[-] abc  Video abc"));
        assert!(card.contains("3 days ago · 1:00 · skipped"));
        assert!(card.contains("https://www.youtube.com/embed/abc"));
    }

    #[test]
    fn test_render_channel_line() {
        let mut channel = ChannelState::new("UC1".into(), "@one".into(), None);
        assert!(render_channel_line(&channel, 2).contains("UC1  UC1  ? videos, 2 unwatched"));
        channel.title = Some("One".into());
        channel.video_count = Some(7);
        assert!(render_channel_line(&channel, 0).contains("UC1  One  7 videos, 0 unwatched"));
    }
}
