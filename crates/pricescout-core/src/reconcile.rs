//! Cheapest-offer selection and smart price-history reconciliation.

use rust_decimal::Decimal;

use crate::result::VendorResult;

/// Absolute price-equality tolerance, in currency units.
///
/// Two observations within one cent of each other are the same real-world
/// price; the gap only ever comes from rounding noise between
/// independently scraped representations of it.
pub const PRICE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// The winning offer for one MPN across all vendors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheapestOffer {
    pub vendor_id: String,
    pub price: Decimal,
    pub url: Option<String>,
}

/// What the persistence layer should do with a fresh observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// No prior record, or the price moved by more than [`PRICE_TOLERANCE`].
    InsertNew,
    /// Price unchanged within tolerance; only bump the latest record's
    /// timestamp.
    RefreshTimestamp,
    /// No price to record.
    NoOp,
}

/// Picks the minimum-price `found` entry from one MPN's ordered results.
///
/// Ties break toward the earliest vendor in registration order, which is
/// the iteration order of `results`. Returns `None` when no vendor found
/// the item.
#[must_use]
pub fn cheapest(results: &[VendorResult]) -> Option<CheapestOffer> {
    let mut best: Option<(&VendorResult, Decimal)> = None;
    for result in results.iter().filter(|r| r.found) {
        let Some(price) = result.price else {
            continue;
        };
        match best {
            Some((_, best_price)) if best_price <= price => {}
            _ => best = Some((result, price)),
        }
    }
    best.map(|(r, price)| CheapestOffer {
        vendor_id: r.vendor_id.clone(),
        price,
        url: r.url.clone(),
    })
}

/// Decides whether an observation is a real price movement.
///
/// `prior` is the price on the latest stored record for this (mpn, vendor),
/// if any. The caller applies the returned action against storage.
#[must_use]
pub fn reconcile(prior: Option<Decimal>, new_price: Option<Decimal>) -> ReconcileAction {
    let Some(new_price) = new_price else {
        return ReconcileAction::NoOp;
    };
    match prior {
        None => ReconcileAction::InsertNew,
        Some(prior) if (prior - new_price).abs() > PRICE_TOLERANCE => ReconcileAction::InsertNew,
        Some(_) => ReconcileAction::RefreshTimestamp,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::result::VendorResult;

    fn found(vendor: &str, price: &str) -> VendorResult {
        VendorResult::found(
            vendor,
            format!("https://{vendor}.example/p"),
            "MPN-1".to_string(),
            Decimal::from_str(price).unwrap(),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn cheapest_picks_minimum_found_price() {
        let results = vec![
            VendorResult::not_found("a"),
            found("b", "100.00"),
            found("c", "95.00"),
        ];
        let offer = cheapest(&results).expect("two vendors found it");
        assert_eq!(offer.vendor_id, "c");
        assert_eq!(offer.price, Decimal::from_str("95.00").unwrap());
    }

    #[test]
    fn cheapest_breaks_ties_by_registration_order() {
        let results = vec![found("first", "50.00"), found("second", "50.00")];
        assert_eq!(cheapest(&results).unwrap().vendor_id, "first");
    }

    #[test]
    fn cheapest_is_none_when_nothing_found() {
        let results = vec![VendorResult::not_found("a"), VendorResult::not_found("b")];
        assert!(cheapest(&results).is_none());
    }

    #[test]
    fn reconcile_inserts_when_no_prior_record() {
        let action = reconcile(None, Some(Decimal::from_str("100").unwrap()));
        assert_eq!(action, ReconcileAction::InsertNew);
    }

    #[test]
    fn reconcile_refreshes_within_tolerance() {
        let action = reconcile(
            Some(Decimal::from_str("100.00").unwrap()),
            Some(Decimal::from_str("100.004").unwrap()),
        );
        assert_eq!(action, ReconcileAction::RefreshTimestamp);
    }

    #[test]
    fn reconcile_inserts_on_real_movement() {
        let action = reconcile(
            Some(Decimal::from_str("100.00").unwrap()),
            Some(Decimal::from_str("101.00").unwrap()),
        );
        assert_eq!(action, ReconcileAction::InsertNew);
    }

    #[test]
    fn reconcile_noop_without_new_price() {
        assert_eq!(
            reconcile(Some(Decimal::from_str("100.00").unwrap()), None),
            ReconcileAction::NoOp
        );
        assert_eq!(reconcile(None, None), ReconcileAction::NoOp);
    }

    #[test]
    fn tolerance_is_exactly_one_cent() {
        assert_eq!(PRICE_TOLERANCE.to_string(), "0.01");
        // Exactly one cent apart is "unchanged"; strictly more is a movement.
        assert_eq!(
            reconcile(
                Some(Decimal::from_str("100.00").unwrap()),
                Some(Decimal::from_str("100.01").unwrap()),
            ),
            ReconcileAction::RefreshTimestamp
        );
        assert_eq!(
            reconcile(
                Some(Decimal::from_str("100.00").unwrap()),
                Some(Decimal::from_str("100.011").unwrap()),
            ),
            ReconcileAction::InsertNew
        );
    }
}
