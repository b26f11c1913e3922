use anyhow::{Context, Result, ensure};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt, pin_mut};
use tokio_util::sync::CancellationToken;

use crate::store::Store;
use crate::youtube::VideoPage;

/// 按页获取频道视频的数据源，客户端通过代理服务实现
#[async_trait]
pub trait VideoPageSource: Send + Sync {
    async fn list_videos(&self, channel_id: &str, page_token: Option<&str>) -> Result<VideoPage>;
}

/// 同步的统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub pages: usize,
    pub fetched: usize,
    pub added: usize,
    pub cancelled: bool,
}

/// 依次请求每一页，直到不再返回 nextPageToken
pub fn into_page_stream<'a>(
    source: &'a dyn VideoPageSource,
    channel_id: &'a str,
) -> impl Stream<Item = Result<VideoPage>> + 'a {
    try_stream! {
        let mut page_token: Option<String> = None;
        let mut page_idx = 1;
        loop {
            let page = source
                .list_videos(channel_id, page_token.as_deref())
                .await
                .with_context(|| format!("failed to list videos of channel {} page {}", channel_id, page_idx))?;
            let next_page_token = page.next_page_token.clone().filter(|t| !t.is_empty());
            yield page;
            match next_page_token {
                Some(token) => {
                    page_token = Some(token);
                    page_idx += 1;
                }
                None => break,
            }
        }
    }
}

/// 拉取频道的全部视频，每获取一页立刻合并进 Store
///
/// 取消后不再修改 Store；某一页请求失败时中止同步，已合并的页面保留
pub async fn sync_channel(
    source: &dyn VideoPageSource,
    store: &mut Store,
    channel_id: &str,
    token: &CancellationToken,
) -> Result<SyncReport> {
    ensure!(!store.is_fetching(), "channel {} is already syncing", channel_id);
    let mut report = SyncReport::default();
    if token.is_cancelled() {
        report.cancelled = true;
        return Ok(report);
    }
    store.set_fetching(true);
    let stream = into_page_stream(source, channel_id);
    pin_mut!(stream);
    let res = loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            page = stream.next() => Some(page),
        };
        let Some(page) = next else {
            report.cancelled = true;
            break Ok(());
        };
        let page = match page {
            None => break Ok(()),
            Some(Err(e)) => break Err(e),
            Some(Ok(page)) => page,
        };
        if token.is_cancelled() {
            report.cancelled = true;
            break Ok(());
        }
        let fetched = page.videos.len();
        let summary = match store.set_videos(channel_id, page.videos) {
            Ok(summary) => summary,
            Err(e) => break Err(e),
        };
        report.pages += 1;
        report.fetched += fetched;
        report.added += summary.added;
        debug!(
            "频道 {} 第 {} 页：新增 {} 个视频，更新 {} 个视频",
            channel_id, report.pages, summary.added, summary.updated
        );
    };
    store.set_fetching(false);
    res?;
    if report.cancelled {
        warn!("频道 {} 的同步已取消，已合并 {} 页", channel_id, report.pages);
    } else {
        info!(
            "频道 {} 同步完成，共获取 {} 页 {} 个视频，新增 {} 个",
            channel_id, report.pages, report.fetched, report.added
        );
    }
    Ok(report)
}
