//! Mwave Australia (www.mwave.com.au).
//!
//! The single-hit search results page embeds the authoritative SKU field,
//! so no second product-page fetch is needed: validation reuses the
//! search-phase payload. The SKU cell reads "SKU# <value>"; the last
//! whitespace token is the part number, compared case-sensitively.

use async_trait::async_trait;
use pricescout_core::VendorResult;
use regex::Regex;

use crate::adapter::VendorAdapter;
use crate::error::TransportError;
use crate::fetch::Fetcher;
use crate::parse::{parse_price, strip_tags};
use crate::registry::ScraperConfig;

const VENDOR_ID: &str = "mwave";
const BASE_URL: &str = "https://www.mwave.com.au";

pub struct MwaveAdapter {
    fetcher: Fetcher,
    base_url: String,
}

impl MwaveAdapter {
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ScraperConfig) -> Result<Self, TransportError> {
        Ok(Self {
            fetcher: Fetcher::new(config.request_timeout_secs, &config.user_agent)?,
            base_url: BASE_URL.to_string(),
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
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl VendorAdapter for MwaveAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let url = format!("{}/searchresult?button=go&w={mpn}&cnt=1", self.base_url);
        let html = self.fetcher.get_html(&url).await?;
        Ok(parse_search_page(&html, mpn, &url))
    }
}

fn parse_search_page(html: &str, mpn: &str, url: &str) -> VendorResult {
    let sku_re = Regex::new(r#"<span class="sku"[^>]*>([^<]+)</span>"#).expect("valid regex");
    let Some(sku_text) = sku_re.captures(html).and_then(|c| c.get(1)) else {
        return VendorResult::not_found(VENDOR_ID);
    };
    let matches_mpn = sku_text
        .as_str()
        .split_whitespace()
        .next_back()
        .is_some_and(|token| token == mpn);
    if !matches_mpn {
        return VendorResult::not_found(VENDOR_ID);
    }

    let price_re =
        Regex::new(r#"(?s)class="divPriceNormal"[^>]*>(.*?)</div>"#).expect("valid regex");
    let Some(price) = price_re
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price(&strip_tags(m.as_str())))
    else {
        return VendorResult::not_found(VENDOR_ID);
    };

    VendorResult::found(VENDOR_ID, url.to_string(), mpn.to_string(), price, None, None)
        .unwrap_or_else(|| VendorResult::not_found(VENDOR_ID))
}
