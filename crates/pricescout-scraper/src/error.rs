use thiserror::Error;

/// Transport-level vendor failures.
///
/// "Not found" is never one of these: adapters report a benign miss as a
/// successful `VendorResult { found: false }`. Anything here means the
/// vendor could not be queried at all, which coordinators log differently
/// from a miss before degrading the slot to not-found.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// An anti-bot interstitial was served instead of the page. Classified
    /// as a transport failure, not a miss, so a temporarily blocked vendor
    /// is never mistaken for one that does not stock the product.
    #[error("anti-bot challenge served by {url}")]
    BotChallenge { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but did not have the shape this adapter knows.
    /// Vendor endpoints drift; an unexpected schema is indistinguishable
    /// from a blocked or broken endpoint.
    #[error("unexpected payload shape from {url}: {reason}")]
    MalformedPayload { url: String, reason: String },

    #[error("page render failed for {url}: {reason}")]
    RenderFailed { url: String, reason: String },
}
