/// OCR misreads of "total" seen on thermal-printed receipts.
pub const DEFAULT_CORRECTIONS: &[(&str, &str)] = &[
    ("tofal", "total"),
    ("totai", "total"),
    ("tota1", "total"),
];

/// Lowercase `text` and rewrite known keyword misreads, applied in order.
pub fn normalize(text: &str, corrections: &[(String, String)]) -> String {
    corrections
        .iter()
        .fold(text.to_lowercase(), |acc, (from, to)| acc.replace(from.as_str(), to))
}

pub fn default_corrections() -> Vec<(String, String)> {
    DEFAULT_CORRECTIONS
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixes_total_misreads() {
        let c = default_corrections();
        assert_eq!(normalize("TOFAL 5.00", &c), "total 5.00");
        assert_eq!(normalize("Totai: 1", &c), "total: 1");
        assert_eq!(normalize("tota1 amount", &c), "total amount");
    }

    #[test]
    fn leaves_other_text_alone() {
        let c = default_corrections();
        assert_eq!(normalize("Subtotal 3.00", &c), "subtotal 3.00");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize("", &default_corrections()), "");
    }
}
