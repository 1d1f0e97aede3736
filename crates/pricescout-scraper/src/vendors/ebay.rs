//! eBay Australia (www.ebay.com.au).
//!
//! Marketplace listings carry seller-typed item specifics, so unlike the
//! retail vendors the MPN comparison is case-insensitive. The search is
//! filtered to Buy It Now listings sorted cheapest first, and the first
//! few item links are visited until one's specifics confirm the part
//! number. Listings may be second-hand, so the condition field is read
//! from the page rather than defaulted.

use async_trait::async_trait;
use pricescout_core::VendorResult;
use regex::Regex;

use crate::adapter::VendorAdapter;
use crate::error::TransportError;
use crate::fetch::Fetcher;
use crate::parse::{parse_price, strip_tags};
use crate::registry::ScraperConfig;

const VENDOR_ID: &str = "ebay_au";
const BASE_URL: &str = "https://www.ebay.com.au";

// Candidate listings checked per search before giving up. The sort is
// cheapest first, so anything beyond the first couple of confirmed
// misses is noise.
const MAX_CANDIDATES: usize = 2;

pub struct EbayAdapter {
    fetcher: Fetcher,
    base_url: String,
}

impl EbayAdapter {
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
impl VendorAdapter for EbayAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        // LH_BIN=1 filters to Buy It Now, _sop=15 sorts by price plus
        // postage ascending.
        let search_url = format!("{}/sch/i.html?_nkw={mpn}&LH_BIN=1&_sop=15", self.base_url);
        let search_html = self.fetcher.get_html(&search_url).await?;

        for listing_url in listing_links(&search_html).into_iter().take(MAX_CANDIDATES) {
            let page = self.fetcher.get_html(&listing_url).await?;
            let result = parse_listing_page(&page, mpn, &listing_url);
            if result.found {
                return Ok(result);
            }
        }

        Ok(VendorResult::not_found(VENDOR_ID))
    }
}

/// Item links from the search results, in page order. The first `s-item`
/// card is frequently a tracking placeholder without an `/itm/` link, so
/// filtering on the path shape drops it naturally.
fn listing_links(html: &str) -> Vec<String> {
    let link_re =
        Regex::new(r#"<a[^>]*class="[^"]*s-item__link[^"]*"[^>]*href="([^"]+)""#)
            .expect("valid regex");
    let mut seen = Vec::new();
    for caps in link_re.captures_iter(html) {
        if let Some(href) = caps.get(1) {
            let href = href.as_str();
            if href.contains("/itm/") && !seen.iter().any(|s| s == href) {
                seen.push(href.to_string());
            }
        }
    }
    seen
}

fn parse_listing_page(html: &str, mpn: &str, url: &str) -> VendorResult {
    if !listing_mentions_mpn(html, mpn) {
        return VendorResult::not_found(VENDOR_ID);
    }

    let Some(price) = extract_listing_price(html) else {
        return VendorResult::not_found(VENDOR_ID);
    };

    let condition = extract_condition(html);

    VendorResult::found(VENDOR_ID, url.to_string(), mpn.to_string(), price, None, condition)
        .unwrap_or_else(|| VendorResult::not_found(VENDOR_ID))
}

/// Looks for "MPN: <value>" in the item specifics text. Seller-typed
/// fields vary in casing, so the comparison folds case.
fn listing_mentions_mpn(html: &str, mpn: &str) -> bool {
    let text = strip_tags(html);
    let mpn_re = Regex::new(r"(?i)\bMPN:?\s+([A-Za-z0-9\-]+)").expect("valid regex");
    for caps in mpn_re.captures_iter(&text) {
        if let Some(value) = caps.get(1) {
            if value.as_str().eq_ignore_ascii_case(mpn) {
                return true;
            }
        }
    }
    false
}

/// Several page layouts are in circulation; the `itemprop` content
/// attribute is the most stable, with the visible primary price span as
/// a fallback.
fn extract_listing_price(html: &str) -> Option<rust_decimal::Decimal> {
    let itemprop_re =
        Regex::new(r#"itemprop="price"[^>]*content="([^"]+)""#).expect("valid regex");
    if let Some(price) = itemprop_re
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price(m.as_str()))
    {
        return Some(price);
    }

    let primary_re = Regex::new(
        r#"(?s)class="[^"]*x-price-primary[^"]*"[^>]*>.*?<span[^>]*>([^<]+)</span>"#,
    )
    .expect("valid regex");
    primary_re
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price(m.as_str()))
}

fn extract_condition(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?s)class="[^"]*x-item-condition[^"]*"[^>]*>(.*?)</div>"#)
        .expect("valid regex");
    let text = re
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| strip_tags(m.as_str()))?;
    let lowered = text.to_lowercase();
    if lowered.contains("refurbished") {
        Some("Refurbished".to_string())
    } else if lowered.contains("used")
        || lowered.contains("pre-owned")
        || lowered.contains("like new")
    {
        Some("Used".to_string())
    } else if lowered.contains("new") {
        Some("New".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const LISTING: &str = r#"
        <html><body>
        <h1 class="x-item-title__mainTitle">Intel Core i3-12100F CPU</h1>
        <div class="x-item-condition">Condition: Brand New</div>
        <div class="x-price-primary"><span class="ux-textspans">AU $239.95</span></div>
        <div class="ux-labels-values">
            <div class="ux-labels-values__labels">MPN:</div>
            <div class="ux-labels-values__values">bx8071512100f</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn mpn_match_is_case_insensitive() {
        let result = parse_listing_page(LISTING, "BX8071512100F", "https://x/itm/1");
        assert!(result.found);
        assert_eq!(result.price, Some(Decimal::new(23_995, 2)));
        assert_eq!(result.condition.as_deref(), Some("New"));
    }

    #[test]
    fn itemprop_content_price_wins_over_visible_span() {
        let html = format!(
            r#"{LISTING}<span itemprop="price" content="240.00"></span>"#
        );
        let result = parse_listing_page(&html, "BX8071512100F", "https://x/itm/1");
        assert_eq!(result.price, Some(Decimal::new(24_000, 2)));
    }

    #[test]
    fn listing_without_matching_specifics_is_not_found() {
        let result = parse_listing_page(LISTING, "BX8071512100", "https://x/itm/1");
        assert!(!result.found);
    }

    #[test]
    fn used_condition_is_carried_through() {
        let html = LISTING.replace("Brand New", "Used");
        let result = parse_listing_page(&html, "BX8071512100F", "https://x/itm/1");
        assert!(result.found);
        assert_eq!(result.condition.as_deref(), Some("Used"));
    }

    #[test]
    fn placeholder_card_without_itm_link_is_skipped() {
        let html = r#"
            <a class="s-item__link" href="https://ebay.com.au/sch/placeholder">x</a>
            <a class="s-item__link" href="https://www.ebay.com.au/itm/12345">y</a>
            <a class="s-item__link" href="https://www.ebay.com.au/itm/12345">y again</a>
        "#;
        assert_eq!(
            listing_links(html),
            vec!["https://www.ebay.com.au/itm/12345".to_string()]
        );
    }
}
