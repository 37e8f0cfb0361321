use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

re!(re_numeric_slash, r"\b[0-9]{2}/[0-9]{2}/[0-9]{4}\b");
re!(re_numeric_dash, r"\b[0-9]{2}-[0-9]{2}-[0-9]{4}\b");
re!(re_iso, r"\b[0-9]{4}-[0-9]{2}-[0-9]{2}\b");
re!(re_day_month_name, r"\b[0-9]{1,2}\s+[A-Za-z]{3,}\s+[0-9]{4}\b");
re!(re_month_name_day, r"\b[A-Za-z]{3,}\s+[0-9]{1,2},\s+[0-9]{4}\b");

/// How to read the two leading numbers of an ambiguous `NN/NN/YYYY` date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `03/04/2024` is March 4th.
    #[default]
    MonthFirst,
    /// `03/04/2024` is April 3rd.
    DayFirst,
}

/// One surface form a receipt date may take.
#[derive(Debug, Clone, Copy)]
pub struct DatePattern {
    pub name: &'static str,
    regex: &'static Regex,
}

impl DatePattern {
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex.find(text).map(|m| m.as_str())
    }
}

/// Date patterns in match-priority order. The first pattern that both matches
/// and parses wins, regardless of where in the text its match sits.
pub fn standard_date_patterns() -> Vec<DatePattern> {
    vec![
        DatePattern { name: "nn/nn/yyyy", regex: re_numeric_slash() },
        DatePattern { name: "nn-nn-yyyy", regex: re_numeric_dash() },
        DatePattern { name: "yyyy-mm-dd", regex: re_iso() },
        DatePattern { name: "d month yyyy", regex: re_day_month_name() },
        DatePattern { name: "month d, yyyy", regex: re_month_name_day() },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseFailure {
    #[error("unrecognized word '{0}'")]
    UnknownWord(String),
    #[error("'{0}' does not have a day, month and year")]
    Shape(String),
    #[error("'{0}' is not a calendar date")]
    OutOfRange(String),
}

/// Find the receipt date in raw (un-normalized) OCR text.
///
/// Only the first match of each pattern is tried. A match that fails to parse
/// moves on to the next pattern; it never retries the same pattern further
/// along the text.
pub fn extract_date(text: &str, patterns: &[DatePattern], order: DateOrder) -> Option<NaiveDate> {
    for pattern in patterns {
        let Some(matched) = pattern.find(text) else {
            continue;
        };
        match parse_date_phrase(matched, order) {
            Ok(date) => {
                debug!(pattern = pattern.name, matched, %date, "date extracted");
                return Some(date);
            }
            Err(e) => {
                trace!(pattern = pattern.name, matched, error = %e, "discarding unparseable date");
            }
        }
    }
    None
}

/// Loosely parse a short date phrase such as `14/05/2023`, `5 May 2023` or
/// `Sept 3, 2021`.
pub fn parse_date_phrase(phrase: &str, order: DateOrder) -> Result<NaiveDate, DateParseFailure> {
    let mut month_word = None;
    let mut numbers: Vec<&str> = Vec::new();

    let tokens = phrase
        .split(|c: char| c.is_whitespace() || matches!(c, '/' | '-' | '.' | ','))
        .filter(|t| !t.is_empty());
    for token in tokens {
        if token.chars().all(|c| c.is_ascii_digit()) {
            numbers.push(token);
        } else if let Some(month) = month_from_name(token) {
            if month_word.replace(month).is_some() {
                return Err(DateParseFailure::Shape(phrase.to_string()));
            }
        } else {
            return Err(DateParseFailure::UnknownWord(token.to_string()));
        }
    }

    let num = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| DateParseFailure::OutOfRange(phrase.to_string()))
    };

    let (year, month, day) = match (month_word, numbers.as_slice()) {
        (Some(month), &[a, b]) => {
            let (day, year) = match (a.len(), b.len()) {
                (_, 4) => (a, b),
                (4, _) => (b, a),
                _ => return Err(DateParseFailure::Shape(phrase.to_string())),
            };
            (num(year)?, month, num(day)?)
        }
        (None, &[y, m, d]) if y.len() == 4 => (num(y)?, num(m)?, num(d)?),
        (None, &[a, b, y]) => {
            let (first, second, year) = (num(a)?, num(b)?, num(y)?);
            let (month, day) = match order {
                DateOrder::MonthFirst => (first, second),
                DateOrder::DayFirst => (second, first),
            };
            // An impossible month with a plausible day means the other order was meant.
            if month > 12 && day <= 12 {
                (year, day, month)
            } else {
                (year, month, day)
            }
        }
        _ => return Err(DateParseFailure::Shape(phrase.to_string())),
    };

    if year == 0 {
        return Err(DateParseFailure::OutOfRange(phrase.to_string()));
    }
    i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        .ok_or_else(|| DateParseFailure::OutOfRange(phrase.to_string()))
}

fn month_from_name(word: &str) -> Option<u32> {
    let month = match word.to_ascii_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}
