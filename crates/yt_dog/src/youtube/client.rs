use std::sync::Once;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use reqwest::{Method, header};
use serde_json::Value;

use crate::config::Config;
use crate::youtube::{Validate, YouTubeError};

// 一个对 reqwest::Client 的简单封装，代理服务与客户端共用
#[derive(Clone)]
pub struct Client(reqwest::Client);

impl Client {
    pub fn new() -> Self {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");
        });
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("yt-dog/", env!("CARGO_PKG_VERSION"))),
        );
        Self(
            reqwest::Client::builder()
                .default_headers(headers)
                .gzip(true)
                .connect_timeout(Duration::from_secs(10))
                .read_timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build reqwest client"),
        )
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.0.request(method, url)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// 访问 YouTube Data API v3 的客户端，持有服务端的 api key
pub struct YouTubeClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    pub(crate) page_size: u32,
}

impl YouTubeClient {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>, page_size: u32) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
            page_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base.clone(), config.api_key.clone(), config.page_size)
    }

    /// 缺少 api key 时所有接口都应直接失败，服务本身仍然可以启动
    pub fn ensure_api_key(&self) -> Result<&str> {
        Ok(self.api_key.as_deref().ok_or(YouTubeError::MissingApiKey)?)
    }

    /// 请求某个接口并检查响应中的错误信息
    pub(crate) async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        let api_key = self.ensure_api_key()?;
        let url = format!("{}/{}", self.api_base.trim_end_matches('/'), endpoint);
        let res = self
            .client
            .request(Method::GET, &url)
            .query(query)
            .query(&[("key", api_key)])
            .send()
            .await
            .with_context(|| format!("failed to request {endpoint}"))?;
        let status = res.status();
        let body = res
            .json::<Value>()
            .await
            .with_context(|| format!("failed to decode response of {endpoint}"))?
            .validate()?;
        ensure!(status.is_success(), YouTubeError::UnexpectedStatus(status.as_u16()));
        Ok(body)
    }
}
