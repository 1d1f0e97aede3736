//! Shared extraction helpers for vendor pages.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

/// Parses a scraped price string into an exact decimal amount.
///
/// Strips currency symbols, "AU $"-style prefixes, and thousands
/// separators, then takes the first numeric run. Binary floats never enter
/// the pipeline, so `"245.00"` stays `245.00` and not `244.99999999`.
///
/// Returns `None` when no numeric amount can be recovered; callers treat
/// that as "price unextractable", a benign miss.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    let re = Regex::new(r"\d+(?:\.\d+)?").expect("valid regex");
    let matched = re.find(&cleaned)?;
    Decimal::from_str(matched.as_str()).ok()
}

/// Maps a vendor's free-text availability label to the tri-state stock
/// flag. Unknown wording maps to `None`, never to a guess.
#[must_use]
pub fn parse_stock_text(text: &str) -> Option<bool> {
    let lowered = text.to_lowercase();
    if lowered.contains("out of stock") || lowered.contains("discontinued") {
        return Some(false);
    }
    if lowered.contains("pre order") || lowered.contains("preorder") {
        return Some(false);
    }
    // "At other stores" still means the item can be bought.
    if lowered.contains("other store") || lowered.contains("in stock") {
        return Some(true);
    }
    None
}

/// Reduces an HTML fragment to its visible text.
///
/// Good enough for the small captured fragments the adapters feed it
/// (a price cell, a spec row); not a general HTML-to-text pass.
#[must_use]
pub fn strip_tags(fragment: &str) -> String {
    let re = Regex::new(r"<[^>]*>").expect("valid regex");
    let without_tags = re.replace_all(fragment, " ");
    let collapsed = Regex::new(r"\s+").expect("valid regex");
    collapsed.replace_all(&without_tags, " ").trim().to_string()
}
