use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

mod args;
mod default;
mod global;

pub use crate::config::args::{ARGS, Args, Command, version};
use crate::config::default::{
    default_api_base, default_bind_address, default_data_dir, default_page_size, default_proxy_url,
};
pub use crate::config::global::{CONFIG_DIR, load_config};

#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    /// 代理服务监听的地址
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// YouTube Data API 的 key，仅代理服务需要
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// 客户端访问代理服务使用的地址
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// 频道、视频与观看记录的保存位置
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            api_base: default_api_base(),
            proxy_url: default_proxy_url(),
            page_size: default_page_size(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join("config.toml");
        match std::fs::read_to_string(&config_path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("配置文件不存在，使用默认配置..");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)?;
        std::fs::write(config_dir.join("config.toml"), toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn check(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.bind_address.parse::<SocketAddr>().is_err() {
            errors.push("bind_address 不是合法的监听地址");
        }
        if reqwest::Url::parse(&self.api_base).is_err() {
            errors.push("api_base 不是合法的 URL");
        }
        if reqwest::Url::parse(&self.proxy_url).is_err() {
            errors.push("proxy_url 不是合法的 URL");
        }
        if !(1..=50).contains(&self.page_size) {
            errors.push("page_size 必须在 1 到 50 之间");
        }
        if !self.data_dir.is_absolute() {
            errors.push("data_dir 应为绝对路径");
        }
        if !errors.is_empty() {
            bail!(
                errors
                    .into_iter()
                    .map(|e| format!("- {}", e))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
        Ok(())
    }

    /// 命令行参数（以及对应的环境变量）优先于配置文件
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(api_key) = args.api_key.as_ref().filter(|key| !key.is_empty()) {
            self.api_key = Some(api_key.clone());
        }
        if let Some(proxy_url) = &args.proxy_url {
            self.proxy_url = proxy_url.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_config_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:12345");
        assert_eq!(config.page_size, 50);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_key: Some("secret".to_owned()),
            page_size: 25,
            data_dir: dir.path().join("data"),
            ..Default::default()
        };
        config.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.page_size, 25);
        assert_eq!(loaded.data_dir, dir.path().join("data"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "page_size = 10\n").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.proxy_url, "http://127.0.0.1:12345");
    }

    #[test]
    fn test_check_collects_errors() {
        let config = Config {
            bind_address: "not an address".to_owned(),
            page_size: 0,
            data_dir: PathBuf::from("relative"),
            ..Default::default()
        };
        let message = config.check().unwrap_err().to_string();
        assert!(message.contains("bind_address"));
        assert!(message.contains("page_size"));
        assert!(message.contains("data_dir"));
        assert!(!message.contains("api_base"));
    }
}
