use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::{Command, Config};
use crate::proxy::ProxyClient;
use crate::store::{ChannelState, Store, WatchedLedger, WatchedStatus};
use crate::task::http_server;
use crate::view::{open_player, render_channel_line, render_history_line, render_video_card};
use crate::workflow::sync_channel;
use crate::youtube::YouTubeClient;

pub async fn run(command: &Command, config: &Config, token: CancellationToken) -> Result<()> {
    match command {
        Command::Serve => {
            let client = Arc::new(YouTubeClient::from_config(config));
            http_server(client, &config.bind_address, token).await
        }
        Command::Add { input } => add(input, config, &token).await,
        Command::Channels => {
            let store = Store::open(&config.data_dir)?;
            if store.channels().is_empty() {
                println!("No channels yet, add one with `yt-dog add <url>`");
            }
            for channel in store.channels() {
                println!("{}", render_channel_line(channel, store.unwatched_count(&channel.id)));
            }
            Ok(())
        }
        Command::Videos {
            channel,
            page,
            suggestions,
        } => {
            let store = Store::open(&config.data_dir)?;
            let channel = tracked_channel(&store, channel)?;
            let videos = if *suggestions {
                store.suggestions(&channel.id)
            } else {
                store.visible(&channel.id, *page)
            };
            if videos.is_empty() {
                println!("Nothing to watch in {}", channel.display_name());
            }
            let now = Utc::now();
            for video in videos {
                println!("{}", render_video_card(video, now));
            }
            Ok(())
        }
        Command::Sync { channel } => sync(channel.as_deref(), config, &token).await,
        Command::Mark {
            channel,
            video,
            status,
        } => {
            let mut store = Store::open(&config.data_dir)?;
            let channel_id = tracked_channel(&store, channel)?.id.clone();
            if !store.mark_status(&channel_id, video, *status)? {
                bail!("video {} not found in channel {}", video, channel_id);
            }
            WatchedLedger::open(&config.data_dir).record(video, *status)?;
            println!("{video} marked as {status}");
            Ok(())
        }
        Command::Play { channel, video, mark } => {
            let mut store = Store::open(&config.data_dir)?;
            let channel_id = tracked_channel(&store, channel)?.id.clone();
            if store.find_video(&channel_id, video).is_none() {
                bail!("video {} not found in channel {}", video, channel_id);
            }
            let url = open_player(video)?;
            println!("Playing {url}");
            if *mark {
                store.mark_status(&channel_id, video, WatchedStatus::Watched)?;
                let mut ledger = WatchedLedger::open(&config.data_dir);
                if ledger.is_skipped(video) {
                    info!("视频 {} 此前被标记为跳过，改为已观看", video);
                }
                if !ledger.is_watched(video) {
                    ledger.mark_watched(video)?;
                }
            }
            Ok(())
        }
        Command::History { limit } => {
            let store = Store::open(&config.data_dir)?;
            let titles = store
                .channels()
                .iter()
                .flat_map(|c| store.videos(&c.id))
                .map(|v| (v.info.id.as_str(), v.info.title.as_str()))
                .collect::<HashMap<_, _>>();
            let now = Utc::now();
            for entry in WatchedLedger::open(&config.data_dir).history().iter().take(*limit) {
                println!(
                    "{}",
                    render_history_line(entry, titles.get(entry.video_id.as_str()).copied(), now)
                );
            }
            Ok(())
        }
    }
}

fn tracked_channel<'a>(store: &'a Store, key: &str) -> Result<&'a ChannelState> {
    match store.find_channel(key) {
        Some(channel) => Ok(channel),
        None => bail!("channel {} is not tracked, add it with `yt-dog add` first", key),
    }
}

async fn add(input: &str, config: &Config, token: &CancellationToken) -> Result<()> {
    let proxy = ProxyClient::new(config.proxy_url.as_str());
    let resolved = proxy.resolve(input).await?;
    let channel_id = resolved.channel_id.clone();
    // 频道信息获取失败不影响添加，标题与数量留空
    let info = match proxy.channel_info(&channel_id).await {
        Ok(info) => Some(info),
        Err(e) => {
            warn!("获取频道 {} 的信息失败：{:#}", channel_id, e);
            None
        }
    };
    let mut store = Store::open(&config.data_dir)?;
    let channel = ChannelState::new(channel_id.clone(), input.trim().to_owned(), resolved.title).with_info(info.as_ref());
    let name = channel.display_name().to_owned();
    if store.add_channel(channel)? {
        info!("已添加频道 {}（{}）", name, channel_id);
    } else {
        info!("频道 {}（{}）已存在，仅同步视频", name, channel_id);
    }
    let report = sync_channel(&proxy, &mut store, &channel_id, token).await?;
    println!(
        "{} ({}): {} videos fetched, {} new",
        name, channel_id, report.fetched, report.added
    );
    Ok(())
}

async fn sync(key: Option<&str>, config: &Config, token: &CancellationToken) -> Result<()> {
    let proxy = ProxyClient::new(config.proxy_url.as_str());
    let mut store = Store::open(&config.data_dir)?;
    let channel_ids = match key {
        Some(key) => vec![tracked_channel(&store, key)?.id.clone()],
        None => store.channels().iter().map(|c| c.id.clone()).collect(),
    };
    if channel_ids.is_empty() {
        info!("没有需要同步的频道");
        return Ok(());
    }
    let mut failed = 0;
    for channel_id in &channel_ids {
        if token.is_cancelled() {
            break;
        }
        match proxy.channel_info(channel_id).await {
            Ok(info) => {
                store.refresh_channel(channel_id, Some(info.title), Some(info.video_count))?;
            }
            Err(e) => warn!("刷新频道 {} 的信息失败：{:#}", channel_id, e),
        }
        match sync_channel(&proxy, &mut store, channel_id, token).await {
            Ok(report) => println!(
                "{}: {} videos fetched, {} new{}",
                channel_id,
                report.fetched,
                report.added,
                if report.cancelled { " (cancelled)" } else { "" }
            ),
            Err(e) => {
                error!("同步频道 {} 时遇到错误：{:#}", channel_id, e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} channels failed to sync", failed, channel_ids.len());
    }
    Ok(())
}
