use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context, Result};

use crate::config::{Args, Config};

/// 全局的 CONFIG_DIR，表示默认配置文件夹的路径
pub static CONFIG_DIR: LazyLock<PathBuf> =
    LazyLock::new(|| dirs::config_dir().expect("No config path found").join("yt-dog"));

/// 加载配置文件，并用命令行参数覆盖其中的部分配置项
pub fn load_config(args: &Args) -> Result<Config> {
    let config_dir = args.config_dir.clone().unwrap_or_else(|| CONFIG_DIR.clone());
    info!("开始加载配置文件..");
    let config = Config::load(&config_dir)?;
    info!("配置文件加载完毕，覆盖刷新原有配置");
    // 放在命令行覆盖之前保存，避免把环境变量中的 api key 写进配置文件
    config.save(&config_dir).context("保存配置文件时遇到错误")?;
    info!("检查配置文件..");
    config
        .check()
        .with_context(|| format!("位于 {} 的配置文件不合法", config_dir.join("config.toml").display()))?;
    info!("配置文件检查通过");
    Ok(config.with_args(args))
}
