//! The vendor adapter contract and the fallback composition.

use async_trait::async_trait;
use pricescout_core::VendorResult;

use crate::error::TransportError;

/// One vendor's MPN-to-price lookup.
///
/// Implementations follow a two-phase validate-then-extract protocol:
/// search the vendor for candidates, confirm an exact MPN/SKU match
/// (substring and fuzzy matching are disallowed; a CPU and its tray
/// variant must never alias), then extract price, stock, and condition.
///
/// "Not found" is `Ok(VendorResult::not_found(..))`; `Err` is reserved for
/// transport faults (timeout, non-2xx, bot challenge, malformed payload).
#[async_trait]
pub trait VendorAdapter: Send + Sync {
    /// Stable short identifier, e.g. `"scorptec"`. Also the registration
    /// key that fixes this vendor's position in coordinator output.
    fn vendor_id(&self) -> &'static str;

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError>;
}

/// Composes a fast/fragile adapter with a slow/robust one for the same
/// vendor.
///
/// The primary (usually a structured HTTP or API call) runs first; on a
/// transport error or a benign miss the secondary (usually a rendered
/// browser session) runs and its outcome is returned verbatim, even when
/// it also misses or fails. One fallback hop, no retry loop: if both
/// paths fail, that vendor is final for this query.
pub struct FallbackAdapter {
    primary: Box<dyn VendorAdapter>,
    secondary: Box<dyn VendorAdapter>,
}

impl FallbackAdapter {
    #[must_use]
    pub fn new(primary: Box<dyn VendorAdapter>, secondary: Box<dyn VendorAdapter>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl VendorAdapter for FallbackAdapter {
    fn vendor_id(&self) -> &'static str {
        self.primary.vendor_id()
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        match self.primary.lookup(mpn).await {
            Ok(result) if result.found => Ok(result),
            Ok(_) => {
                tracing::debug!(
                    vendor = self.vendor_id(),
                    mpn,
                    "primary path missed, trying fallback"
                );
                self.secondary.lookup(mpn).await
            }
            Err(e) => {
                tracing::warn!(
                    vendor = self.vendor_id(),
                    mpn,
                    error = %e,
                    "primary path failed, trying fallback"
                );
                self.secondary.lookup(mpn).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;

    /// Scripted adapter for exercising the fallback contract.
    struct StubAdapter {
        outcome: StubOutcome,
        calls: Arc<AtomicUsize>,
    }

    enum StubOutcome {
        Found(Decimal),
        NotFound,
        TransportError,
    }

    impl StubAdapter {
        fn new(outcome: StubOutcome) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    outcome,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl VendorAdapter for StubAdapter {
        fn vendor_id(&self) -> &'static str {
            "stub"
        }

        async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                StubOutcome::Found(price) => Ok(VendorResult::found(
                    "stub",
                    "https://stub.example/p".to_string(),
                    mpn.to_string(),
                    *price,
                    None,
                    None,
                )
                .expect("non-negative stub price")),
                StubOutcome::NotFound => Ok(VendorResult::not_found("stub")),
                StubOutcome::TransportError => Err(TransportError::UnexpectedStatus {
                    status: 503,
                    url: "https://stub.example/p".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn secondary_not_invoked_when_primary_finds() {
        let (primary, _) = StubAdapter::new(StubOutcome::Found(Decimal::new(5_000, 2)));
        let (secondary, secondary_calls) = StubAdapter::new(StubOutcome::Found(Decimal::ONE));
        let adapter = FallbackAdapter::new(Box::new(primary), Box::new(secondary));

        let result = adapter.lookup("MPN-1").await.expect("primary succeeds");
        assert!(result.found);
        assert_eq!(result.price, Some(Decimal::new(5_000, 2)));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn primary_error_returns_secondary_result_verbatim() {
        let (primary, _) = StubAdapter::new(StubOutcome::TransportError);
        let (secondary, secondary_calls) = StubAdapter::new(StubOutcome::NotFound);
        let adapter = FallbackAdapter::new(Box::new(primary), Box::new(secondary));

        let result = adapter.lookup("MPN-1").await.expect("secondary answered");
        assert!(!result.found, "secondary's miss is passed through unchanged");
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn primary_miss_falls_back_to_secondary_hit() {
        let (primary, _) = StubAdapter::new(StubOutcome::NotFound);
        let (secondary, _) = StubAdapter::new(StubOutcome::Found(Decimal::new(9_900, 2)));
        let adapter = FallbackAdapter::new(Box::new(primary), Box::new(secondary));

        let result = adapter.lookup("MPN-1").await.expect("secondary succeeds");
        assert!(result.found);
        assert_eq!(result.price, Some(Decimal::new(9_900, 2)));
    }

    #[tokio::test]
    async fn both_paths_failing_is_final() {
        let (primary, primary_calls) = StubAdapter::new(StubOutcome::TransportError);
        let (secondary, secondary_calls) = StubAdapter::new(StubOutcome::TransportError);
        let adapter = FallbackAdapter::new(Box::new(primary), Box::new(secondary));

        let result = adapter.lookup("MPN-1").await;
        assert!(result.is_err());
        // Exactly one attempt each; no retry loop beyond the single hop.
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }
}
