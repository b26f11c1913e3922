use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
pub struct ResolveRequest {
    /// 频道链接、@handle 或频道 ID
    #[serde(alias = "url")]
    #[validate(length(min = 1, message = "input is required"))]
    pub input: String,
}

#[derive(Deserialize)]
pub struct ChannelQuery {
    #[serde(alias = "channelId")]
    pub id: Option<String>,
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
}
