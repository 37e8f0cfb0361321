use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use slipscan_core::ExtractionResult;
use slipscan_ocr::{OcrBackend, PipelineError, ReceiptPipeline};

/// Multipart field carrying the receipt image.
const IMAGE_FIELD: &str = "image";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReceiptPipeline<Box<dyn OcrBackend>>>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
    #[error("Unexpected extraction failure: {0}")]
    Unexpected(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) | ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/ocr", post(scan_receipt))
        .route("/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `POST /ocr` — multipart upload with an `image` field; responds with the
/// extracted `{date, amount, category}`.
pub async fn scan_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionResult>, ApiError> {
    // A body that is not a multipart form carries no image field at all.
    let mut multipart = multipart.map_err(|e| {
        info!(error = %e.body_text(), "upload is not a multipart form");
        ApiError::BadRequest("No image provided".into())
    })?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        upload = Some((filename, data));
        break;
    }

    let Some((filename, data)) = upload else {
        return Err(ApiError::BadRequest("No image provided".into()));
    };
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No selected file".into()));
    }
    info!(%filename, bytes = data.len(), "receipt uploaded");

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.process_bytes(&data)).await;
    match outcome {
        Ok(Ok(scan)) => {
            let r = &scan.extracted;
            info!(%filename, date = ?r.date, amount = ?r.amount, category = %r.category, "receipt extracted");
            Ok(Json(scan.extracted))
        }
        Ok(Err(e)) => {
            error!(%filename, error = %e, "receipt processing failed");
            Err(e.into())
        }
        Err(e) => {
            error!(%filename, error = %e, "receipt processing task aborted");
            Err(ApiError::Unexpected(e.to_string()))
        }
    }
}
