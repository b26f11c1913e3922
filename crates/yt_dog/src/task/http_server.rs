use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Extension;
use tokio_util::sync::CancellationToken;

use crate::api::router;
use crate::config::version;
use crate::youtube::YouTubeClient;

pub async fn http_server(client: Arc<YouTubeClient>, bind_address: &str, token: CancellationToken) -> Result<()> {
    if client.ensure_api_key().is_err() {
        warn!("未配置 YT_API_KEY，所有接口都将返回错误");
    }
    let app = router().layer(Extension(client));
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .context("bind address failed")?;
    info!(
        "yt-dog {} 代理服务已启动，监听地址 http://{}",
        version(),
        listener.local_addr().map_or_else(|_| bind_address.to_owned(), |addr| addr.to_string())
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .context("http server failed")?;
    info!("代理服务已停止");
    Ok(())
}
