use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use slipscan_core::ExtractorConfig;
use slipscan_ocr::{CommandRecognizer, OcrBackend};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SLIPSCAN_CONFIG";
/// Config file picked up from the working directory when `SLIPSCAN_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "slipscan.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngine {
    /// Shell out to the `tesseract` executable.
    #[default]
    Command,
    /// Link libtesseract in-process (needs the `tesseract` feature).
    Tesseract,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub engine: OcrEngine,
    pub command: PathBuf,
    pub lang: String,
    pub data_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngine::default(),
            command: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            data_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_upload_bytes: usize,
    pub ocr: OcrConfig,
    pub extraction: ExtractorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5001)),
            max_upload_bytes: 10 * 1024 * 1024,
            ocr: OcrConfig::default(),
            extraction: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self> {
        toml::from_str(toml_content).context("Failed to parse server config")
    }

    /// `$SLIPSCAN_CONFIG`, else `./slipscan.toml` if present, else defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(Path::new(&path)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn recognizer(&self) -> Result<Box<dyn OcrBackend>> {
        let ocr = &self.ocr;
        match ocr.engine {
            OcrEngine::Command => Ok(Box::new(CommandRecognizer::new(
                &ocr.command,
                &ocr.lang,
                ocr.data_path.clone(),
            ))),
            #[cfg(feature = "tesseract")]
            OcrEngine::Tesseract => Ok(Box::new(slipscan_ocr::TesseractRecognizer::new(
                ocr.data_path.as_ref().map(|p| p.display().to_string()),
                &ocr.lang,
            ))),
            #[cfg(not(feature = "tesseract"))]
            OcrEngine::Tesseract => {
                anyhow::bail!("ocr.engine = \"tesseract\" requires building with the `tesseract` feature")
            }
        }
    }
}
