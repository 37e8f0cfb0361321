use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use slipscan_core::Extractor;
use slipscan_ocr::ReceiptPipeline;
use slipscan_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    let tables = config
        .extraction
        .build_tables()
        .context("Invalid [extraction] config")?;
    let recognizer = config.recognizer()?;
    tracing::info!(engine = ?config.ocr.engine, lang = %config.ocr.lang, "OCR backend ready");

    let pipeline = ReceiptPipeline::new(recognizer, Extractor::new(tables));
    let app = router(AppState { pipeline: Arc::new(pipeline) }, config.max_upload_bytes);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!("Receipt OCR server listening on {}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
