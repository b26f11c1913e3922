use anyhow::{Result, bail};
pub use channel::{Channel, ChannelInfo, ChannelRef, ResolvedChannel, resolve_channel};
pub use client::{Client, YouTubeClient};
pub use error::YouTubeError;
pub use video::{VideoInfo, VideoPage};

mod channel;
mod client;
mod error;
mod video;

pub(crate) trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output>;
}

impl Validate for serde_json::Value {
    type Output = serde_json::Value;

    /// YouTube 在出错时返回 { "error": { "code": ..., "message": ... } }
    fn validate(self) -> Result<Self::Output> {
        if let Some(error) = self.get("error") {
            let code = error["code"].as_i64().unwrap_or_default();
            let message = error["message"].as_str().unwrap_or("unknown error");
            bail!(YouTubeError::ErrorResponse(code, message.to_owned()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_validate_error_response() {
        let res = json!({"error": {"code": 403, "message": "quotaExceeded"}}).validate();
        let err = res.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<YouTubeError>(),
            Some(YouTubeError::ErrorResponse(403, msg)) if msg == "quotaExceeded"
        ));
        let ok = json!({"items": []}).validate().unwrap();
        assert_eq!(ok, json!({"items": []}));
    }

    #[ignore = "only for manual test"]
    #[tokio::test]
    async fn test_list_channel_videos() {
        let api_key = std::env::var("YT_API_KEY").ok();
        let client = YouTubeClient::new("https://www.googleapis.com/youtube/v3", api_key, 50);
        let resolved = resolve_channel(&client, &ChannelRef::Handle("@YouTube".to_owned()))
            .await
            .unwrap();
        let channel = Channel::new(&client, resolved.channel_id);
        let page = channel.get_videos(None).await.unwrap();
        assert!(!page.videos.is_empty());
        assert!(page.videos.iter().any(|v| v.duration.is_some()));
    }
}
