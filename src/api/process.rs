//! Pipeline trigger endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::ApiState;
use crate::Error;

/// Build the process router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/process-image", get(process_image))
        .with_state(state)
}

/// Successful pipeline response
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub analysis: String,
    pub audio_file_path: String,
}

/// Run one full pipeline synchronously
///
/// The request blocks for the whole run: camera warm-up plus two external
/// service round trips.
async fn process_image(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ProcessResponse>, PipelineError> {
    let output = state.pipeline.run().await.map_err(PipelineError)?;

    Ok(Json(ProcessResponse {
        analysis: output.analysis,
        audio_file_path: output.audio_file_path.display().to_string(),
    }))
}

/// Maps stage failures onto HTTP statuses
#[derive(Debug)]
struct PipelineError(Error);

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code) = match self.0 {
            Error::DeviceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "device_unavailable"),
            Error::Capture(_) => (StatusCode::INTERNAL_SERVER_ERROR, "capture_failed"),
            Error::LockTimeout(_) => (StatusCode::INTERNAL_SERVER_ERROR, "lock_timeout"),
            Error::Inference(_) => (StatusCode::INTERNAL_SERVER_ERROR, "inference_failed"),
            Error::Synthesis(_) => (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_failure"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        };

        tracing::warn!(code, error = %self.0, "pipeline run failed");

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody {
                    code,
                    message: self.0.to_string(),
                },
            }),
        )
            .into_response()
    }
}
