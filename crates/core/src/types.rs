use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spending category assigned to a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transportation,
    Entertainment,
    Shopping,
    Bills,
    Health,
    Others,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transportation,
        Category::Entertainment,
        Category::Shopping,
        Category::Bills,
        Category::Health,
        Category::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Health => "Health",
            Category::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}

/// Structured fields pulled out of one receipt's OCR text.
///
/// Serializes as `{"date": "YYYY-MM-DD" | null, "amount": number | null, "category": "<label>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub date: Option<NaiveDate>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub category: Category,
}

impl ExtractionResult {
    /// The record produced for text with nothing recognizable in it.
    pub fn empty() -> Self {
        Self { date: None, amount: None, category: Category::Others }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_display_matches_label() {
        assert_eq!(Category::Transportation.to_string(), "Transportation");
        assert_eq!(Category::Others.to_string(), "Others");
    }

    #[test]
    fn category_from_str_is_case_insensitive() {
        assert_eq!(Category::from_str("food").unwrap(), Category::Food);
        assert_eq!(Category::from_str(" HEALTH ").unwrap(), Category::Health);
        assert!(Category::from_str("Groceries").is_err());
    }

    #[test]
    fn result_serializes_to_wire_shape() {
        let r = ExtractionResult {
            date: NaiveDate::from_ymd_opt(2023, 5, 4),
            amount: Some(Decimal::new(1250, 2)),
            category: Category::Food,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["date"], "2023-05-04");
        assert_eq!(json["amount"], serde_json::json!(12.5));
        assert_eq!(json["category"], "Food");
    }

    #[test]
    fn empty_result_serializes_nulls() {
        let json = serde_json::to_value(ExtractionResult::empty()).unwrap();
        assert!(json["date"].is_null());
        assert!(json["amount"].is_null());
        assert_eq!(json["category"], "Others");
    }
}
