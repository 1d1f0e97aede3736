//! Fan-out and batch coordination across registered vendor adapters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pricescout_core::{QueryBatchItem, VendorResult};
use tokio::sync::Semaphore;

use crate::adapter::VendorAdapter;

/// Progress callback for batch lookups, invoked as `(completed, total)`
/// after each MPN finishes. Read-only signal for UI progress reporting,
/// not a control mechanism.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// The query engine: a fixed, ordered vendor registry plus batch limits.
///
/// The adapter list is injected at construction and never changes, so
/// output columns stay aligned across calls; tests substitute stub
/// adapters without touching global state.
pub struct PriceScout {
    adapters: Arc<Vec<Box<dyn VendorAdapter>>>,
    max_concurrent_mpns: usize,
}

impl PriceScout {
    #[must_use]
    pub fn new(adapters: Vec<Box<dyn VendorAdapter>>, max_concurrent_mpns: usize) -> Self {
        Self {
            adapters: Arc::new(adapters),
            max_concurrent_mpns,
        }
    }

    /// Registered vendor identifiers, in registration order.
    #[must_use]
    pub fn vendor_ids(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.vendor_id()).collect()
    }

    /// Queries every registered vendor for one MPN concurrently.
    ///
    /// Always returns exactly one result per registered adapter, in
    /// registration order regardless of completion order. A transport
    /// failure in one adapter never cancels or reorders its siblings: it
    /// is logged with vendor and MPN context and degraded to a not-found
    /// slot. No overall deadline is imposed here; each adapter owns its
    /// request timeout.
    pub async fn lookup_one(&self, mpn: &str) -> Vec<VendorResult> {
        run_adapters(&self.adapters, mpn).await
    }

    /// Runs [`Self::lookup_one`] for each MPN under the batch concurrency
    /// cap, preserving input order in the output.
    ///
    /// At most `max_concurrent_mpns` MPNs are in flight at once; each MPN
    /// internally fans out to every vendor, so the cap keeps total
    /// outbound connections in a polite range. A panic escaping one batch
    /// item is logged and that MPN is dropped from the output; sibling
    /// MPNs are unaffected.
    pub async fn lookup_batch(
        &self,
        mpns: &[String],
        progress: Option<ProgressFn>,
    ) -> Vec<QueryBatchItem> {
        let total = mpns.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_mpns.max(1)));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(total);
        for mpn in mpns {
            let mpn = mpn.clone();
            let adapters = Arc::clone(&self.adapters);
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            let progress = progress.clone();

            handles.push(tokio::spawn(async move {
                // Permit released on every exit path, including panics,
                // when the guard drops with the task.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("batch semaphore is never closed");
                let results = run_adapters(&adapters, &mpn).await;
                drop(_permit);

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(callback) = &progress {
                    callback(done, total);
                }
                QueryBatchItem { mpn, results }
            }));
        }

        let mut items = Vec::with_capacity(total);
        for (handle, mpn) in handles.into_iter().zip(mpns) {
            match handle.await {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(mpn, error = %e, "batch item dropped after task failure");
                }
            }
        }
        items
    }
}

/// Fan-out over the registry for one MPN; results placed by registration
/// index, not append-on-completion.
async fn run_adapters(adapters: &[Box<dyn VendorAdapter>], mpn: &str) -> Vec<VendorResult> {
    let mpn = mpn.trim();
    let lookups = adapters.iter().map(|adapter| {
        let vendor = adapter.vendor_id();
        async move {
            match adapter.lookup(mpn).await {
                Ok(result) => {
                    if result.found {
                        tracing::info!(vendor, mpn, price = ?result.price, "vendor hit");
                    } else {
                        tracing::debug!(vendor, mpn, "vendor has no exact match");
                    }
                    result
                }
                Err(e) => {
                    tracing::error!(vendor, mpn, error = %e, "vendor lookup failed");
                    VendorResult::not_found(vendor)
                }
            }
        }
    });

    // join_all yields results in the order the futures were supplied,
    // i.e. vendor registration order, independent of completion timing.
    futures::future::join_all(lookups).await
}
