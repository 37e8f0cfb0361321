use crate::amount::extract_amount;
use crate::config::ExtractionTables;
use crate::date::extract_date;
use crate::types::ExtractionResult;

/// Turns raw OCR text into an [`ExtractionResult`].
///
/// Holds only read-only tables, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    tables: ExtractionTables,
}

impl Extractor {
    pub fn new(tables: ExtractionTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ExtractionTables {
        &self.tables
    }

    /// Extract date, total and category from raw OCR text. Never fails: fields
    /// that cannot be found come back as `None`, and the category falls back
    /// to `Others`.
    pub fn extract(&self, ocr_text: &str) -> ExtractionResult {
        let t = &self.tables;
        ExtractionResult {
            date: extract_date(ocr_text, &t.date_patterns, t.date_order),
            amount: extract_amount(ocr_text, &t.corrections),
            category: t.categories.classify(ocr_text, t.category_window),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
