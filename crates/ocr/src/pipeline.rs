use std::path::Path;
use thiserror::Error;
use tracing::debug;

use slipscan_core::{ExtractionResult, Extractor};

use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of a single receipt processing run.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Raw OCR text output.
    pub ocr_text: String,
    /// Structured fields extracted from the OCR text.
    pub extracted: ExtractionResult,
}

/// Orchestrates: preprocess → OCR → extract.
///
/// Every step is synchronous and CPU- or process-bound; async callers should
/// run it on a blocking thread.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    extractor: Extractor,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, extractor: Extractor) -> Self {
        Self { recognizer, extractor }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Process a file on disk.
    pub fn process_file(&self, path: &Path) -> Result<ScanResult, PipelineError> {
        let bytes = std::fs::read(path)?;
        self.process_bytes(&bytes)
    }

    /// Process raw image bytes (an upload or a file read).
    pub fn process_bytes(&self, data: &[u8]) -> Result<ScanResult, PipelineError> {
        let image_bytes = preprocess::prepare_for_ocr_from_bytes(data)?;
        let ocr_text = self.recognizer.recognize(&image_bytes)?;
        debug!(chars = ocr_text.len(), "OCR complete");

        let extracted = self.extractor.extract(&ocr_text);
        Ok(ScanResult { ocr_text, extracted })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::MockRecognizer;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use slipscan_core::Category;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |x, _| Luma([if x < 2 { 20 } else { 200 }]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    struct FailingRecognizer;

    impl OcrBackend for FailingRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
            Err(OcrError::Engine("boom".into()))
        }
    }

    #[test]
    fn process_bytes_extracts_fields() {
        let pipeline = ReceiptPipeline::new(
            MockRecognizer::new("CITY PHARMACY\n2024-01-15\nTotal: 5.50"),
            Extractor::default(),
        );
        let result = pipeline.process_bytes(&tiny_png()).unwrap();
        assert_eq!(result.ocr_text, "CITY PHARMACY\n2024-01-15\nTotal: 5.50");
        assert_eq!(result.extracted.date.unwrap().to_string(), "2024-01-15");
        assert_eq!(result.extracted.amount.unwrap().to_string(), "5.50");
        assert_eq!(result.extracted.category, Category::Health);
    }

    #[test]
    fn undecodable_image_never_reaches_ocr() {
        let pipeline = ReceiptPipeline::new(FailingRecognizer, Extractor::default());
        let err = pipeline.process_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, PipelineError::Preprocess(_)));
    }

    #[test]
    fn ocr_failure_propagates() {
        let pipeline = ReceiptPipeline::new(FailingRecognizer, Extractor::default());
        let err = pipeline.process_bytes(&tiny_png()).unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::Engine(_))));
    }

    #[test]
    fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.png");
        std::fs::write(&path, tiny_png()).unwrap();
        let pipeline = ReceiptPipeline::new(MockRecognizer::new("taxi 12.00"), Extractor::default());
        let result = pipeline.process_file(&path).unwrap();
        assert_eq!(result.extracted.category, Category::Transportation);
    }

    #[test]
    fn missing_file_is_io_error() {
        let pipeline = ReceiptPipeline::new(MockRecognizer::new(""), Extractor::default());
        let err = pipeline.process_file(Path::new("/nonexistent/receipt.png")).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
