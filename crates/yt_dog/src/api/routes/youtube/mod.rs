use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::{Extension, Query, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};

use crate::api::error::InnerApiError;
use crate::api::request::{ChannelQuery, ResolveRequest};
use crate::api::wrapper::{ApiError, ApiResponse, ValidatedJson};
use crate::youtube::{Channel, ChannelInfo, ChannelRef, ResolvedChannel, VideoPage, YouTubeClient, resolve_channel};

pub(super) fn router() -> Router {
    Router::new()
        .route("/resolve", post(resolve))
        // 早期客户端使用的路径，行为与 /resolve 一致
        .route("/resolve-channel", post(resolve))
        .route("/channel", get(get_channel))
        .route("/videos", get(get_videos))
        .route_layer(middleware::from_fn(require_api_key))
}

/// 未配置 api key 时，在解析请求参数之前直接拒绝
async fn require_api_key(
    Extension(client): Extension<Arc<YouTubeClient>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    client.ensure_api_key()?;
    Ok(next.run(request).await)
}

fn required_id(params: &ChannelQuery) -> Result<String, ApiError> {
    params
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| InnerApiError::BadRequest("id is required".to_owned()).into())
}

/// 将频道链接、@handle 或频道 ID 解析为频道 ID
pub async fn resolve(
    Extension(client): Extension<Arc<YouTubeClient>>,
    ValidatedJson(request): ValidatedJson<ResolveRequest>,
) -> Result<ApiResponse<ResolvedChannel>, ApiError> {
    let channel_ref = ChannelRef::parse(&request.input)
        .ok_or_else(|| InnerApiError::BadRequest("input is required".to_owned()))?;
    debug!("解析频道输入 {:?}", channel_ref);
    Ok(ApiResponse::ok(resolve_channel(&client, &channel_ref).await?))
}

/// 获取频道标题与视频数量
pub async fn get_channel(
    Extension(client): Extension<Arc<YouTubeClient>>,
    Query(params): Query<ChannelQuery>,
) -> Result<ApiResponse<ChannelInfo>, ApiError> {
    let id = required_id(&params)?;
    Ok(ApiResponse::ok(Channel::new(&client, id).get_info().await?))
}

/// 获取频道上传列表中的一页视频，pageToken 为上一页返回的 nextPageToken
pub async fn get_videos(
    Extension(client): Extension<Arc<YouTubeClient>>,
    Query(params): Query<ChannelQuery>,
) -> Result<ApiResponse<VideoPage>, ApiError> {
    let id = required_id(&params)?;
    let page = Channel::new(&client, id)
        .get_videos(params.page_token.as_deref())
        .await?;
    Ok(ApiResponse::ok(page))
}
