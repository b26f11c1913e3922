use std::path::PathBuf;

use crate::config::CONFIG_DIR;

pub(super) fn default_bind_address() -> String {
    "0.0.0.0:12345".to_string()
}

pub(super) fn default_api_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

pub(super) fn default_proxy_url() -> String {
    "http://127.0.0.1:12345".to_string()
}

/// YouTube playlistItems 接口单页最多返回 50 条
pub(super) fn default_page_size() -> u32 {
    50
}

pub(super) fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("yt-dog"))
        .unwrap_or_else(|| CONFIG_DIR.join("data"))
}
