use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::normalize::normalize;

re!(re_number, r"[0-9]+\.[0-9]{2}|[0-9]+,[0-9]{2}|[0-9]+");

/// Phrases marking the grand-total line, strongest first.
const INVOICE_VALUE: &str = "total invoice value";
const TOTAL_AMOUNT: &str = "total amount";
const TOTAL_LABEL: &str = "total:";

/// Best-guess grand total of a receipt.
///
/// Lines are scanned top to bottom for a total-indicator phrase; failing that,
/// bottom to top for any "total" line that is not a subtotal; failing that, the
/// largest number anywhere in the text is taken.
pub fn extract_amount(text: &str, corrections: &[(String, String)]) -> Option<Decimal> {
    let text = normalize(text, corrections);
    let lines: Vec<&str> = text.split('\n').collect();

    for line in &lines {
        let tier = if line.contains(INVOICE_VALUE) {
            INVOICE_VALUE
        } else if line.contains(TOTAL_AMOUNT) {
            TOTAL_AMOUNT
        } else if line.contains(TOTAL_LABEL) && !is_subtotal(line) {
            TOTAL_LABEL
        } else {
            continue;
        };
        if let Some(amount) = last_number(line) {
            debug!(tier, %amount, "amount from indicator line");
            return Some(amount);
        }
    }

    let from_total_line = lines
        .iter()
        .rev()
        .filter(|l| l.contains("total") && !l.contains("subtotal"))
        .find_map(|l| last_number(l));
    if let Some(amount) = from_total_line {
        debug!(%amount, "amount from last total line");
        return Some(amount);
    }

    let largest = numbers_in(&text).into_iter().max();
    if let Some(amount) = largest {
        debug!(%amount, "amount from largest number");
    }
    largest
}

fn is_subtotal(line: &str) -> bool {
    line.contains("sub total") || line.contains("subtotal")
}

/// All numeric tokens in `text` once intra-line whitespace is removed.
/// A comma before exactly two trailing digits is read as a decimal point.
fn numbers_in(text: &str) -> Vec<Decimal> {
    let compact: String = text
        .chars()
        .filter(|c| *c == '\n' || !c.is_whitespace())
        .collect();
    re_number()
        .find_iter(&compact)
        .map(|m| parse_token(&m.as_str().replace(',', ".")))
        .collect()
}

/// Tokens are ASCII digits with an optional two-digit fraction, so the only
/// way parsing fails is a value too wide for `Decimal`; those saturate.
fn parse_token(token: &str) -> Decimal {
    Decimal::from_str(token).unwrap_or_else(|e| {
        trace!(token, error = %e, "numeric token out of range, saturating");
        Decimal::MAX
    })
}

fn last_number(line: &str) -> Option<Decimal> {
    numbers_in(line).pop()
}
