use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::{CategoryKeywordTable, DEFAULT_CATEGORY_WINDOW};
use crate::date::{standard_date_patterns, DateOrder, DatePattern};
use crate::normalize::default_corrections;
use crate::types::Category;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse extraction config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    UnknownCategory(String),
    #[error("Category window must be at least 1 character")]
    EmptyWindow,
    #[error("Empty keyword in category '{0}'")]
    EmptyKeyword(String),
}

/// One `[[categories]]` row of the extraction config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryKeywords {
    pub category: String,
    pub keywords: Vec<String>,
}

/// User-tunable knobs for extraction, usually the `[extraction]` section of
/// the server config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractorConfig {
    pub date_order: DateOrder,
    pub category_window: usize,
    /// Replaces the built-in keyword table when present. Row order is match order.
    pub categories: Option<Vec<CategoryKeywords>>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            date_order: DateOrder::default(),
            category_window: DEFAULT_CATEGORY_WINDOW,
            categories: None,
        }
    }
}

impl ExtractorConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    /// Validate and build the immutable tables the extractors read from.
    pub fn build_tables(&self) -> Result<ExtractionTables, ConfigError> {
        if self.category_window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        let categories = match &self.categories {
            None => CategoryKeywordTable::default(),
            Some(rows) => CategoryKeywordTable::new(
                rows.iter()
                    .map(|row| {
                        let category = row
                            .category
                            .parse::<Category>()
                            .map_err(ConfigError::UnknownCategory)?;
                        // An empty keyword is a substring of every text.
                        if row.keywords.iter().any(|k| k.trim().is_empty()) {
                            return Err(ConfigError::EmptyKeyword(row.category.clone()));
                        }
                        Ok::<_, ConfigError>((category, row.keywords.clone()))
                    })
                    .collect::<Result<_, ConfigError>>()?,
            ),
        };
        Ok(ExtractionTables {
            corrections: default_corrections(),
            date_patterns: standard_date_patterns(),
            categories,
            category_window: self.category_window,
            date_order: self.date_order,
        })
    }
}

/// Read-only lookup tables shared by every extraction. Built once at startup.
#[derive(Debug, Clone)]
pub struct ExtractionTables {
    pub corrections: Vec<(String, String)>,
    pub date_patterns: Vec<DatePattern>,
    pub categories: CategoryKeywordTable,
    pub category_window: usize,
    pub date_order: DateOrder,
}

impl Default for ExtractionTables {
    fn default() -> Self {
        Self {
            corrections: default_corrections(),
            date_patterns: standard_date_patterns(),
            categories: CategoryKeywordTable::default(),
            category_window: DEFAULT_CATEGORY_WINDOW,
            date_order: DateOrder::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = ExtractorConfig::from_toml("").unwrap();
        assert_eq!(cfg, ExtractorConfig::default());
        let tables = cfg.build_tables().unwrap();
        assert_eq!(tables.category_window, 3000);
        assert_eq!(tables.date_order, DateOrder::MonthFirst);
        assert_eq!(tables.date_patterns.len(), 5);
        assert_eq!(tables.categories, CategoryKeywordTable::default());
    }

    #[test]
    fn parses_date_order_and_categories() {
        let toml = r#"
            date_order = "day_first"
            category_window = 500

            [[categories]]
            category = "Health"
            keywords = ["Vet"]

            [[categories]]
            category = "food"
            keywords = ["bakery"]
        "#;
        let tables = ExtractorConfig::from_toml(toml).unwrap().build_tables().unwrap();
        assert_eq!(tables.date_order, DateOrder::DayFirst);
        assert_eq!(tables.category_window, 500);
        assert_eq!(tables.categories.rows()[0], (Category::Health, vec!["vet".to_string()]));
        assert_eq!(tables.categories.rows()[1].0, Category::Food);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let toml = r#"
            [[categories]]
            category = "Groceries"
            keywords = ["milk"]
        "#;
        let err = ExtractorConfig::from_toml(toml).unwrap().build_tables().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCategory(_)));
    }

    #[test]
    fn blank_keyword_is_rejected() {
        for keyword in ["\"\"", "\"  \""] {
            let toml = format!("[[categories]]\ncategory = \"Bills\"\nkeywords = [\"rent\", {keyword}]\n");
            let err = ExtractorConfig::from_toml(&toml).unwrap().build_tables().unwrap_err();
            assert!(matches!(err, ConfigError::EmptyKeyword(ref c) if c == "Bills"));
        }
    }

    #[test]
    fn zero_window_is_rejected() {
        let cfg = ExtractorConfig { category_window: 0, ..Default::default() };
        assert!(matches!(cfg.build_tables(), Err(ConfigError::EmptyWindow)));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            ExtractorConfig::from_toml("date_order = \"sideways\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
