//! HTTP API server for the taskmaster pipeline

pub mod health;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::pipeline::Pipeline;
use crate::{Error, Result};

/// Shared state for API handlers
pub struct ApiState {
    /// The one pipeline instance; runs are not isolated from each other
    pub pipeline: Pipeline,
}

/// Build the full application router
///
/// Narration artifacts are served read-only under `/narration` so the
/// returned `audio_file_path` is playable by the page.
pub fn router(state: Arc<ApiState>, narration_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(health::router())
        .merge(process::router(state))
        .nest_service("/narration", ServeDir::new(narration_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
}

/// Static trigger page
async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

/// Bind and serve until the process is terminated
///
/// # Errors
///
/// Returns error if the listener cannot bind or the server fails
pub async fn serve(state: Arc<ApiState>, narration_dir: PathBuf, port: u16) -> Result<()> {
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Config(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "api server listening");
    axum::serve(listener, router(state, &narration_dir)).await?;
    Ok(())
}
