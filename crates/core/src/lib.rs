/// Declares a function returning a lazily compiled, process-wide regex.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod amount;
pub mod category;
pub mod config;
pub mod date;
pub mod extract;
pub mod normalize;
pub mod types;

pub use category::CategoryKeywordTable;
pub use config::{CategoryKeywords, ConfigError, ExtractionTables, ExtractorConfig};
pub use date::{DateOrder, DateParseFailure, DatePattern};
pub use extract::Extractor;
pub use types::{Category, ExtractionResult};
