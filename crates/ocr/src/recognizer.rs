use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG image bytes and return the recognized text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string — useful for unit testing the extraction pipeline
/// without requiring Tesseract to be installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Command-line backend (default) ────────────────────────────────────────────

/// Runs the `tesseract` executable on a temporary copy of the image and reads
/// the recognized text from its stdout.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: PathBuf,
    lang: String,
    data_path: Option<PathBuf>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<PathBuf>, lang: &str, data_path: Option<PathBuf>) -> Self {
        Self { program: program.into(), lang: lang.to_string(), data_path }
    }
}

impl OcrBackend for CommandRecognizer {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let mut file = tempfile::Builder::new()
            .prefix("slipscan-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Engine(format!("temp file: {e}")))?;
        file.write_all(image_bytes)
            .map_err(|e| OcrError::Engine(format!("temp file: {e}")))?;

        let mut cmd = Command::new(&self.program);
        cmd.arg(file.path()).arg("stdout").arg("-l").arg(&self.lang);
        if let Some(dir) = &self.data_path {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        debug!(program = %self.program.display(), lang = %self.lang, "running OCR command");

        let output = cmd.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => OcrError::NotAvailable(self.program.display().to_string()),
            _ => OcrError::Engine(e.to_string()),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!("{}: {}", output.status, stderr.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    /// In-process Tesseract via libtesseract. A fresh engine is created per
    /// call, since `LepTess` is not `Sync`.
    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
