//! 测试用的假 YouTube 接口与代理服务
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::youtube::YouTubeClient;

type Params = Query<HashMap<String, String>>;

async fn search(Query(params): Params) -> Json<Value> {
    let items = match params.get("q").map(String::as_str) {
        Some("@known") | Some("known") => {
            json!([{"snippet": {"channelId": "UCknown", "channelTitle": "Known"}}])
        }
        _ => json!([]),
    };
    Json(json!({ "items": items }))
}

async fn channels(Query(params): Params) -> Json<Value> {
    let items = match params.get("id").map(String::as_str) {
        Some("UCknown") => json!([{
            "id": "UCknown",
            "snippet": {"title": "Known"},
            "statistics": {"videoCount": "3"},
            "contentDetails": {"relatedPlaylists": {"uploads": "UUknown"}}
        }]),
        Some("UCnouploads") => json!([{"id": "UCnouploads", "snippet": {"title": "Empty"}}]),
        _ => json!([]),
    };
    Json(json!({ "items": items }))
}

fn playlist_item(id: Option<&str>, published_at: &str, thumbnail: bool) -> Value {
    let mut snippet = json!({
        "title": format!("Video {}", id.unwrap_or("?")),
        "publishedAt": published_at,
        "channelTitle": "Item Channel"
    });
    if thumbnail {
        snippet["thumbnails"] = json!({"medium": {"url": "https://i.ytimg.com/vi/medium.jpg"}});
    }
    json!({
        "contentDetails": {"videoId": id, "videoPublishedAt": published_at},
        "snippet": snippet
    })
}

async fn playlist_items(Query(params): Params) -> impl IntoResponse {
    match params.get("pageToken").map(String::as_str) {
        None => (
            StatusCode::OK,
            Json(json!({
                "items": [
                    playlist_item(Some("v1"), "2024-05-03T00:00:00Z", true),
                    playlist_item(Some("v2"), "2024-05-02T00:00:00Z", false),
                    playlist_item(None, "2024-05-01T00:00:00Z", true)
                ],
                "nextPageToken": "p2"
            })),
        ),
        Some("p2") => (
            StatusCode::OK,
            Json(json!({
                "items": [playlist_item(Some("v3"), "2024-04-01T00:00:00Z", true)],
                "nextPageToken": ""
            })),
        ),
        _ => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"code": 403, "message": "quotaExceeded"}})),
        ),
    }
}

async fn videos(Query(params): Params) -> Json<Value> {
    let items = params
        .get("id")
        .map(|ids| {
            ids.split(',')
                .map(|id| json!({"id": id, "contentDetails": {"duration": "PT1M5S"}}))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    Json(json!({ "items": items }))
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    addr
}

/// 启动一个假的 YouTube Data API，返回其 base url
pub(crate) async fn spawn_fake_upstream() -> String {
    let app = Router::new()
        .route("/search", get(search))
        .route("/channels", get(channels))
        .route("/playlistItems", get(playlist_items))
        .route("/videos", get(videos));
    format!("http://{}", serve(app).await)
}

pub(crate) fn proxy_router(upstream: &str, api_key: Option<&str>) -> Router {
    let client = YouTubeClient::new(upstream, api_key.map(str::to_owned), 50);
    super::router().layer(Extension(Arc::new(client)))
}

/// 启动连接到假接口的代理服务，返回其 base url
pub(crate) async fn spawn_proxy() -> String {
    let upstream = spawn_fake_upstream().await;
    format!("http://{}", serve(proxy_router(&upstream, Some("key"))).await)
}
