use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum YouTubeError {
    #[error("Server missing YT_API_KEY")]
    MissingApiKey,
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("uploads playlist not found for channel {0}")]
    UploadsNotFound(String),
    #[error("API returned error code {0}: {1}")]
    ErrorResponse(i64, String),
    #[error("API returned unexpected status {0}")]
    UnexpectedStatus(u16),
}

impl YouTubeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, YouTubeError::ChannelNotFound(_) | YouTubeError::UploadsNotFound(_))
    }
}
