use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};

use crate::store::WatchedStatus;

pub static ARGS: LazyLock<Args> = LazyLock::new(Args::parse);

#[derive(Parser)]
#[command(name = "yt-dog", version = detail_version(), about, long_about = None)]
pub struct Args {
    #[arg(short, long, default_value = "None,yt_dog=info", env = "RUST_LOG")]
    pub log_level: String,

    #[arg(short, long, env = "YT_DOG_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// 覆盖配置文件中的 api_key，仅在 serve 时使用
    #[arg(long, env = "YT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// 覆盖配置文件中的 proxy_url
    #[arg(long, env = "YT_DOG_PROXY_URL")]
    pub proxy_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// 启动代理服务，转发频道解析与视频列表请求
    Serve,
    /// 通过频道链接、@handle 或频道 ID 添加频道，并同步其视频
    Add { input: String },
    /// 列出已添加的频道
    Channels,
    /// 查看某个频道下未观看的视频
    Videos {
        channel: String,
        #[arg(short, long, default_value_t = 0)]
        page: usize,
        /// 仅展示最新的、既未观看也未跳过的视频
        #[arg(short, long)]
        suggestions: bool,
    },
    /// 同步指定频道（不指定则同步全部频道）的视频列表
    Sync { channel: Option<String> },
    /// 修改视频的观看状态
    Mark {
        channel: String,
        video: String,
        status: WatchedStatus,
    },
    /// 在浏览器中播放视频
    Play {
        channel: String,
        video: String,
        /// 播放后直接标记为已观看
        #[arg(short, long)]
        mark: bool,
    },
    /// 按时间倒序列出标记记录
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub fn version() -> Cow<'static, str> {
    if let (Some(git_version), Some(git_dirty)) = (built_info::GIT_VERSION, built_info::GIT_DIRTY) {
        Cow::Owned(format!("{}{}", git_version, if git_dirty { "-dirty" } else { "" }))
    } else {
        Cow::Borrowed(built_info::PKG_VERSION)
    }
}

fn detail_version() -> String {
    format!(
        "{}
Architecture: {}-{}
Author: {}
Built Time: {}
Rustc Version: {}",
        version(),
        built_info::CFG_OS,
        built_info::CFG_TARGET_ARCH,
        built_info::PKG_AUTHORS,
        built_info::BUILT_TIME_UTC,
        built_info::RUSTC_VERSION,
    )
}
