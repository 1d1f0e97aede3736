//! Normalized per-vendor lookup results.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Every vendor in this system quotes Australian dollars.
pub const DEFAULT_CURRENCY: &str = "AUD";

/// The outcome of one vendor lookup for one MPN.
///
/// Constructed once per adapter invocation and never mutated afterwards;
/// the reconciler and the persistence layer only read it.
///
/// Invariants, enforced by the constructors:
/// - `found == false` implies `price`, `url`, and `mpn_confirmed` are all
///   `None`.
/// - `found == true` implies `price` is present and non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorResult {
    /// Stable short vendor identifier, e.g. `"scorptec"`.
    pub vendor_id: String,
    /// Product page link; absent when not found.
    pub url: Option<String>,
    /// MPN as read back from the vendor page, for verification.
    pub mpn_confirmed: Option<String>,
    /// Exact decimal price; absent when not found or unextractable.
    pub price: Option<Decimal>,
    /// ISO currency code; always `"AUD"` here.
    pub currency: String,
    /// Tri-state stock status: in stock, out of stock, or unknown.
    pub in_stock: Option<bool>,
    /// Listing condition, e.g. `"New"` or `"Used"`.
    pub condition: Option<String>,
    /// True only when the vendor page confirmed an exact MPN match and a
    /// price was extracted.
    pub found: bool,
    /// UTC timestamp taken at the moment of extraction.
    pub scraped_at: DateTime<Utc>,
}

impl VendorResult {
    /// A benign "vendor has no such product" sentinel.
    #[must_use]
    pub fn not_found(vendor_id: &str) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            url: None,
            mpn_confirmed: None,
            price: None,
            currency: DEFAULT_CURRENCY.to_string(),
            in_stock: None,
            condition: None,
            found: false,
            scraped_at: Utc::now(),
        }
    }

    /// A confirmed match with an extracted price.
    ///
    /// `condition` falls back to `"New"` when the vendor does not state one.
    /// Returns `None` when `price` is negative, since a found result with a
    /// negative price would violate the type's invariant.
    #[must_use]
    pub fn found(
        vendor_id: &str,
        url: String,
        mpn_confirmed: String,
        price: Decimal,
        in_stock: Option<bool>,
        condition: Option<String>,
    ) -> Option<Self> {
        if price.is_sign_negative() {
            return None;
        }
        Some(Self {
            vendor_id: vendor_id.to_string(),
            url: Some(url),
            mpn_confirmed: Some(mpn_confirmed),
            price: Some(price),
            currency: DEFAULT_CURRENCY.to_string(),
            in_stock,
            condition: condition.or_else(|| Some("New".to_string())),
            found: true,
            scraped_at: Utc::now(),
        })
    }
}

/// One input MPN paired with its ordered per-vendor results.
///
/// `results` always has one entry per registered vendor, including failed
/// and not-found entries, so callers can index by vendor position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryBatchItem {
    pub mpn: String,
    pub results: Vec<VendorResult>,
}
