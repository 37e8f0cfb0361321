pub mod config;
pub mod routes;

pub use config::{OcrConfig, OcrEngine, ServerConfig};
pub use routes::{router, ApiError, AppState};
