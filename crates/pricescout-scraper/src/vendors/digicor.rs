//! Digicor (www.digicor.com.au).
//!
//! Catalog search returns product cards as `<form class="product-item">`
//! blocks; the first spec list item ends with the model number, compared
//! case-sensitively. Stock state is readable from the card itself.

use async_trait::async_trait;
use pricescout_core::VendorResult;
use regex::Regex;

use crate::adapter::VendorAdapter;
use crate::error::TransportError;
use crate::fetch::Fetcher;
use crate::parse::{parse_price, parse_stock_text, strip_tags};
use crate::registry::ScraperConfig;

const VENDOR_ID: &str = "digicor";
const BASE_URL: &str = "https://www.digicor.com.au";

pub struct DigicorAdapter {
    fetcher: Fetcher,
    base_url: String,
}

impl DigicorAdapter {
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
impl VendorAdapter for DigicorAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let url = format!("{}/catalogsearch/result/?q={mpn}", self.base_url);
        let html = self.fetcher.get_html(&url).await?;
        Ok(parse_search_page(&html, mpn, &url))
    }
}

fn parse_search_page(html: &str, mpn: &str, search_url: &str) -> VendorResult {
    let card_re =
        Regex::new(r#"(?s)<form[^>]*class="product-item"[^>]*>(.*?)</form>"#).expect("valid regex");
    let Some(card) = card_re.captures(html).and_then(|c| c.get(1)) else {
        return VendorResult::not_found(VENDOR_ID);
    };
    let card = card.as_str();

    // First spec row, e.g. "<li>Model: D3-S4510-960G</li>"; last token is
    // the model number.
    let model_re = Regex::new(r"(?s)<li[^>]*>(.*?)</li>").expect("valid regex");
    let matches_mpn = model_re
        .captures(card)
        .and_then(|c| c.get(1))
        .map(|m| strip_tags(m.as_str()))
        .and_then(|text| text.split_whitespace().next_back().map(str::to_string))
        .is_some_and(|token| token == mpn);
    if !matches_mpn {
        return VendorResult::not_found(VENDOR_ID);
    }

    let price_re = Regex::new(r#"(?s)<span class="price"[^>]*>(.*?)</span>"#).expect("valid regex");
    let Some(price) = price_re
        .captures(card)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price(&strip_tags(m.as_str())))
    else {
        return VendorResult::not_found(VENDOR_ID);
    };

    // Product link from the photo anchor; fall back to the search URL.
    let link_re =
        Regex::new(r#"<a[^>]*class="product photo"[^>]*href="([^"]+)""#).expect("valid regex");
    let product_url = link_re
        .captures(card)
        .and_then(|c| c.get(1))
        .map_or_else(|| search_url.to_string(), |m| m.as_str().to_string());

    let in_stock = parse_stock_text(&strip_tags(card));

    VendorResult::found(VENDOR_ID, product_url, mpn.to_string(), price, in_stock, None)
        .unwrap_or_else(|| VendorResult::not_found(VENDOR_ID))
}
