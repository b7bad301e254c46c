//! Keep-alive HTTP endpoint.
//!
//! ホスティング側の死活監視（アイドル停止の回避）用。中身は固定文字列のみ。

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::KeepAliveConfig;

pub const BANNER: &str = "🤖 Nudgify Bot is running!";

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
}

async fn home() -> &'static str {
    BANNER
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

pub async fn bind(config: &KeepAliveConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port)).await
}

/// Serve until `shutdown_rx` flips to true (or its sender is dropped).
pub async fn serve(
    listener: TcpListener,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("keep-alive server listening on http://{addr}");
    }
    axum::serve(listener, router())
        .with_graceful_shutdown(async move {
            while !*shutdown_rx.borrow() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
}
