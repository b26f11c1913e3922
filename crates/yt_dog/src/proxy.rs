use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::workflow::VideoPageSource;
use crate::youtube::{ChannelInfo, Client, ResolvedChannel, VideoPage};

/// 访问代理服务的客户端，命令行通过它获取数据而不直接持有 api key
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/youtube/{}", self.base_url, path)
    }

    /// 非 2xx 响应中的 { "error": ... } 会被作为错误信息返回
    async fn parse<T: DeserializeOwned>(res: reqwest::Response, action: &str) -> Result<T> {
        let status = res.status();
        if status.is_success() {
            return res
                .json::<T>()
                .await
                .with_context(|| format!("failed to decode response of {action}"));
        }
        let message = res
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body["error"].as_str().map(str::to_owned))
            .unwrap_or_else(|| status.to_string());
        Err(anyhow!("failed to {action}: {message} ({status})"))
    }

    pub async fn resolve(&self, input: &str) -> Result<ResolvedChannel> {
        let res = self
            .client
            .request(Method::POST, &self.url("resolve"))
            .json(&json!({ "input": input }))
            .send()
            .await
            .with_context(|| format!("failed to reach proxy at {}", self.base_url))?;
        Self::parse(res, "resolve channel").await
    }

    pub async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo> {
        let res = self
            .client
            .request(Method::GET, &self.url("channel"))
            .query(&[("id", channel_id)])
            .send()
            .await
            .with_context(|| format!("failed to reach proxy at {}", self.base_url))?;
        Self::parse(res, "get channel info").await
    }

    pub async fn list_videos(&self, channel_id: &str, page_token: Option<&str>) -> Result<VideoPage> {
        let mut request = self
            .client
            .request(Method::GET, &self.url("videos"))
            .query(&[("id", channel_id)]);
        if let Some(page_token) = page_token.filter(|t| !t.is_empty()) {
            request = request.query(&[("pageToken", page_token)]);
        }
        let res = request
            .send()
            .await
            .with_context(|| format!("failed to reach proxy at {}", self.base_url))?;
        Self::parse(res, "list videos").await
    }
}

#[async_trait]
impl VideoPageSource for ProxyClient {
    async fn list_videos(&self, channel_id: &str, page_token: Option<&str>) -> Result<VideoPage> {
        ProxyClient::list_videos(self, channel_id, page_token).await
    }
}
