use tracing::debug;

use crate::types::Category;

/// Characters of (lowercased) text the classifier looks at.
pub const DEFAULT_CATEGORY_WINDOW: usize = 3000;

const DEFAULT_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Food, &["restaurant", "cafe", "food", "meal", "burger", "pizza", "domino"]),
    (Category::Transportation, &["taxi", "uber", "fuel", "gas", "metro", "toll"]),
    (Category::Entertainment, &["movie", "concert", "game", "netflix", "spotify"]),
    (Category::Shopping, &["store", "shop", "mall", "purchase", "buy", "walmart"]),
    (Category::Bills, &["bill", "electricity", "water", "internet", "rent"]),
    (Category::Health, &["hospital", "pharmacy", "medicine", "doctor", "clinic"]),
];

/// Ordered category → trigger-substring table. Earlier rows win ties.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryKeywordTable {
    rows: Vec<(Category, Vec<String>)>,
}

impl CategoryKeywordTable {
    /// Keywords are stored lowercased; row order is preserved as given.
    pub fn new(rows: Vec<(Category, Vec<String>)>) -> Self {
        let rows = rows
            .into_iter()
            .map(|(category, keywords)| {
                (category, keywords.into_iter().map(|k| k.to_lowercase()).collect())
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[(Category, Vec<String>)] {
        &self.rows
    }

    /// First category with any keyword inside the first `window` characters
    /// of `text`, or `Others`.
    pub fn classify(&self, text: &str, window: usize) -> Category {
        let text: String = text.to_lowercase().chars().take(window).collect();
        let hit = self.rows.iter().find_map(|(category, keywords)| {
            keywords
                .iter()
                .find(|k| text.contains(k.as_str()))
                .map(|k| (*category, k))
        });
        match hit {
            Some((category, keyword)) => {
                debug!(%category, keyword = keyword.as_str(), "category matched");
                category
            }
            None => Category::Others,
        }
    }
}

impl Default for CategoryKeywordTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(category, words)| (*category, words.iter().map(|w| w.to_string()).collect()))
                .collect(),
        )
    }
}
