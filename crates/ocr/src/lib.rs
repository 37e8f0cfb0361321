pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use pipeline::{PipelineError, ReceiptPipeline, ScanResult};
pub use preprocess::{prepare_for_ocr, prepare_for_ocr_from_bytes, PreprocessError};
pub use recognizer::{CommandRecognizer, MockRecognizer, OcrBackend, OcrError};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
