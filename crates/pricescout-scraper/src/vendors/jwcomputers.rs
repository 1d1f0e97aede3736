//! JW Computers (www.jw.com.au).
//!
//! Queries the store's Algolia search index directly instead of the
//! JavaScript storefront. The public API keys ship in the website's own
//! network traffic. The hit payload embeds an authoritative `mpn` field,
//! so validation needs no second fetch; the comparison is case-sensitive.

use async_trait::async_trait;
use pricescout_core::VendorResult;
use rust_decimal::Decimal;
use serde_json::json;

use crate::adapter::VendorAdapter;
use crate::error::TransportError;
use crate::fetch::Fetcher;
use crate::registry::ScraperConfig;

const VENDOR_ID: &str = "jw_computers";
const CATALOG_URL: &str = "https://catalog.jw.com.au";
const SITE_URL: &str = "https://www.jw.com.au";
const INDEX_NAME: &str = "m2live_default_products";

// Public search-only keys, as served to every storefront visitor.
const ALGOLIA_APP_ID: &str = "KDNP96B3XK";
const ALGOLIA_API_KEY: &str = "ODA4MDI2NDg3OWI5MTFmNTNhNWUzYzAxMmFjZThiMzQxOGQ1ZDhlOTRhZDI1YWQwNjM4NDA3MmU5YTU1NjEyZHRhZ0ZpbHRlcnM9JnZhbGlkVW50aWw9MTc2NjcwNTI3OA==";

pub struct JwComputersAdapter {
    fetcher: Fetcher,
    catalog_url: String,
    site_url: String,
}

impl JwComputersAdapter {
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ScraperConfig) -> Result<Self, TransportError> {
        Ok(Self {
            fetcher: Fetcher::new(config.request_timeout_secs, &config.user_agent)?,
            catalog_url: CATALOG_URL.to_string(),
            site_url: SITE_URL.to_string(),
        })
    }

    /// Test constructor pointing at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(config: &ScraperConfig, base_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            fetcher: Fetcher::new(config.request_timeout_secs, &config.user_agent)?,
            catalog_url: base_url.to_string(),
            site_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl VendorAdapter for JwComputersAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let url = format!("{}/1/indexes/*/queries", self.catalog_url);
        let payload = json!({
            "requests": [{
                "indexName": INDEX_NAME,
                "query": mpn,
                "params": "hitsPerPage=1&clickAnalytics=true",
            }]
        });
        let headers = [
            ("x-algolia-application-id", ALGOLIA_APP_ID),
            ("x-algolia-api-key", ALGOLIA_API_KEY),
        ];

        let data = self.fetcher.post_json(&url, &headers, &payload).await?;
        parse_response(&data, mpn, &self.site_url, &url)
    }
}

fn parse_response(
    data: &serde_json::Value,
    mpn: &str,
    site_url: &str,
    request_url: &str,
) -> Result<VendorResult, TransportError> {
    let Some(results) = data.get("results").and_then(serde_json::Value::as_array) else {
        // An Algolia response without a results array is schema drift,
        // not an empty index.
        return Err(TransportError::MalformedPayload {
            url: request_url.to_owned(),
            reason: "missing results array".to_string(),
        });
    };

    let Some(hit) = results
        .first()
        .and_then(|r| r.get("hits"))
        .and_then(serde_json::Value::as_array)
        .and_then(|hits| hits.first())
    else {
        return Ok(VendorResult::not_found(VENDOR_ID));
    };

    let hit_mpn = hit.get("mpn").and_then(serde_json::Value::as_str);
    if hit_mpn != Some(mpn) {
        return Ok(VendorResult::not_found(VENDOR_ID));
    }

    let Some(price) = extract_price(hit.get("price")) else {
        return Ok(VendorResult::not_found(VENDOR_ID));
    };

    let product_url = hit
        .get("url")
        .and_then(serde_json::Value::as_str)
        .map(|path| {
            if path.starts_with("http") {
                path.to_string()
            } else {
                format!("{site_url}/{}", path.trim_start_matches('/'))
            }
        })
        .unwrap_or_else(|| site_url.to_string());

    Ok(
        VendorResult::found(VENDOR_ID, product_url, mpn.to_string(), price, None, None)
            .unwrap_or_else(|| VendorResult::not_found(VENDOR_ID)),
    )
}

/// The price field varies: a bare number, a numeric string, or a nested
/// `{"AUD": {"default": ...}}` map. Numbers are routed through their
/// JSON text representation so the value stays an exact decimal.
fn extract_price(value: Option<&serde_json::Value>) -> Option<Decimal> {
    let value = value?;
    match value {
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Object(_) => {
            let nested = value
                .get("AUD")
                .and_then(|aud| aud.get("default"))
                .or_else(|| value.get("default"))?;
            extract_price(Some(nested))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_with_hit(hit: serde_json::Value) -> serde_json::Value {
        json!({"results": [{"hits": [hit]}]})
    }

    #[test]
    fn exact_mpn_hit_with_plain_price() {
        let data = response_with_hit(json!({
            "mpn": "BX8071512100F",
            "price": 245.00,
            "url": "intel-core-i3-12100f.html",
        }));
        let result =
            parse_response(&data, "BX8071512100F", "https://www.jw.com.au", "u").unwrap();
        assert!(result.found);
        assert_eq!(result.price.unwrap().to_string(), "245.0");
        assert_eq!(
            result.url.as_deref(),
            Some("https://www.jw.com.au/intel-core-i3-12100f.html")
        );
    }

    #[test]
    fn nested_aud_price_map_is_understood() {
        let data = response_with_hit(json!({
            "mpn": "BX8071512100F",
            "price": {"AUD": {"default": "245.00"}},
            "url": "https://www.jw.com.au/p",
        }));
        let result =
            parse_response(&data, "BX8071512100F", "https://www.jw.com.au", "u").unwrap();
        assert!(result.found);
        assert_eq!(result.price.unwrap().to_string(), "245.00");
    }

    #[test]
    fn mpn_mismatch_is_not_found() {
        let data = response_with_hit(json!({"mpn": "BX8071512100", "price": 245.0}));
        let result =
            parse_response(&data, "BX8071512100F", "https://www.jw.com.au", "u").unwrap();
        assert!(!result.found);
    }

    #[test]
    fn empty_hits_is_not_found() {
        let data = json!({"results": [{"hits": []}]});
        let result = parse_response(&data, "X", "https://www.jw.com.au", "u").unwrap();
        assert!(!result.found);
    }

    #[test]
    fn missing_results_array_is_schema_drift() {
        let data = json!({"message": "Invalid Application-ID or API key"});
        let err = parse_response(&data, "X", "https://www.jw.com.au", "u").unwrap_err();
        assert!(matches!(err, TransportError::MalformedPayload { .. }));
    }

    #[test]
    fn missing_price_field_is_a_benign_miss() {
        let data = response_with_hit(json!({"mpn": "X"}));
        let result = parse_response(&data, "X", "https://www.jw.com.au", "u").unwrap();
        assert!(!result.found);
    }
}
