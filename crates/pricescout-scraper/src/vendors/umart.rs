//! Umart (www.umart.com.au).
//!
//! Two-step vendor: the search phase only yields a candidate product URL,
//! so a second fetch of the product page provides the authoritative
//! `itemprop="mpn"` field, compared case-sensitively, plus the final
//! price and stock state. The plain adapter goes through the store's
//! AJAX suggestion endpoint; the rendered fallback walks the regular
//! search page in a headless browser instead.

use async_trait::async_trait;
use pricescout_core::VendorResult;
use regex::Regex;

use crate::adapter::VendorAdapter;
use crate::error::TransportError;
use crate::fetch::Fetcher;
use crate::parse::{parse_price, parse_stock_text, strip_tags};
use crate::registry::ScraperConfig;
use crate::render::PageRenderer;

const VENDOR_ID: &str = "umart";
const BASE_URL: &str = "https://www.umart.com.au";

pub struct UmartAdapter {
    fetcher: Fetcher,
    base_url: String,
}

impl UmartAdapter {
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
impl VendorAdapter for UmartAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let search_url = format!(
            "{}/ajax_search.php?act=tipword&word={mpn}______0",
            self.base_url
        );
        let data = self.fetcher.get_json(&search_url).await?;

        let Some(fragment) = data
            .get("search_product")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
        else {
            return Ok(VendorResult::not_found(VENDOR_ID));
        };

        let Some(product_url) = first_product_link(fragment, &self.base_url) else {
            return Ok(VendorResult::not_found(VENDOR_ID));
        };

        let html = self.fetcher.get_html(&product_url).await?;
        Ok(parse_product_page(&html, mpn, &product_url))
    }
}

/// Rendered fallback: walks the regular search page and then the
/// candidate product page through a headless browser.
pub struct UmartRenderedAdapter {
    renderer: PageRenderer,
    base_url: String,
}

impl UmartRenderedAdapter {
    #[must_use]
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            renderer: PageRenderer::new(&config.browser_bin, config.render_timeout_secs),
            base_url: BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl VendorAdapter for UmartRenderedAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let search_url = format!("{}/search.php?cat_id=&keywords={mpn}", self.base_url);
        let search_html = self.renderer.render(&search_url).await?;

        let Some(product_url) = first_search_result_link(&search_html, &self.base_url) else {
            return Ok(VendorResult::not_found(VENDOR_ID));
        };

        let html = self.renderer.render(&product_url).await?;
        Ok(parse_product_page(&html, mpn, &product_url))
    }
}

/// First product anchor inside the AJAX suggestion fragment's
/// `goods_name` cell.
fn first_product_link(fragment: &str, base_url: &str) -> Option<String> {
    let re = Regex::new(r#"(?s)class="[^"]*goods_name[^"]*"[^>]*>.*?<a[^>]*href="([^"]+)""#)
        .expect("valid regex");
    re.captures(fragment)
        .and_then(|c| c.get(1))
        .map(|m| absolutize(m.as_str(), base_url))
}

/// First result anchor on the rendered search page.
fn first_search_result_link(html: &str, base_url: &str) -> Option<String> {
    let re = Regex::new(
        r#"(?s)<li[^>]*class="[^"]*search_goods_list[^"]*"[^>]*>.*?<a[^>]*href="([^"]+)""#,
    )
    .expect("valid regex");
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| absolutize(m.as_str(), base_url))
}

fn absolutize(href: &str, base_url: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{base_url}/{}", href.trim_start_matches('/'))
    }
}

fn parse_product_page(html: &str, mpn: &str, url: &str) -> VendorResult {
    let mpn_re = Regex::new(r#"(?s)<[^>]*itemprop="mpn"[^>]*>(.*?)</"#).expect("valid regex");
    let matches_mpn = mpn_re
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| strip_tags(m.as_str()))
        .is_some_and(|page_mpn| page_mpn == mpn);
    if !matches_mpn {
        return VendorResult::not_found(VENDOR_ID);
    }

    let price_re = Regex::new(
        r#"(?s)<span[^>]*class="[^"]*goods-price ele-goods-price[^"]*"[^>]*>(.*?)</span>"#,
    )
    .expect("valid regex");
    let Some(price) = price_re
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price(&strip_tags(m.as_str())))
    else {
        return VendorResult::not_found(VENDOR_ID);
    };

    let stock_re = Regex::new(
        r#"(?s)<[^>]*class="[^"]*(?:goods_stock|stock-status|availability|goods-stock-info)[^"]*"[^>]*>(.*?)</"#,
    )
    .expect("valid regex");
    let in_stock = stock_re
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_stock_text(&strip_tags(m.as_str())));

    VendorResult::found(VENDOR_ID, url.to_string(), mpn.to_string(), price, in_stock, None)
        .unwrap_or_else(|| VendorResult::not_found(VENDOR_ID))
}
