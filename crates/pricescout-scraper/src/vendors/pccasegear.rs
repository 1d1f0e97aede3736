//! PC Case Gear (www.pccasegear.com).
//!
//! Search results are an Algolia InstantSearch hit list that the plain
//! HTML response only carries when the server pre-renders it; otherwise
//! the list is filled in by client-side JavaScript. The plain adapter
//! tries first and the registry falls back to the rendered variant when
//! the hit list never materialises. The first hit's `product-model` span
//! is the authoritative part number, compared case-sensitively.

use async_trait::async_trait;
use pricescout_core::VendorResult;
use regex::Regex;

use crate::adapter::VendorAdapter;
use crate::error::TransportError;
use crate::fetch::Fetcher;
use crate::parse::{parse_price, strip_tags};
use crate::registry::ScraperConfig;
use crate::render::PageRenderer;

const VENDOR_ID: &str = "pccasegear";
const BASE_URL: &str = "https://www.pccasegear.com";

pub struct PcCaseGearAdapter {
    fetcher: Fetcher,
    base_url: String,
}

impl PcCaseGearAdapter {
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
impl VendorAdapter for PcCaseGearAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let url = search_url(&self.base_url, mpn);
        let html = self.fetcher.get_html(&url).await?;
        Ok(parse_search_page(&html, mpn, &self.base_url, &url))
    }
}

/// Rendered fallback: the same search page through a headless browser,
/// which lets the InstantSearch scripts populate the hit list.
pub struct PcCaseGearRenderedAdapter {
    renderer: PageRenderer,
    base_url: String,
}

impl PcCaseGearRenderedAdapter {
    #[must_use]
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            renderer: PageRenderer::new(&config.browser_bin, config.render_timeout_secs),
            base_url: BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl VendorAdapter for PcCaseGearRenderedAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let url = search_url(&self.base_url, mpn);
        let html = self.renderer.render(&url).await?;
        Ok(parse_search_page(&html, mpn, &self.base_url, &url))
    }
}

fn search_url(base_url: &str, mpn: &str) -> String {
    format!("{base_url}/search?query={mpn}")
}

fn parse_search_page(html: &str, mpn: &str, base_url: &str, search_url: &str) -> VendorResult {
    // First hit in the InstantSearch list only; later hits are fuzzy.
    let item_re =
        Regex::new(r#"(?s)<li[^>]*class="[^"]*ais-Hits-item[^"]*"[^>]*>(.*?)</li>"#)
            .expect("valid regex");
    let Some(item) = item_re.captures(html).and_then(|c| c.get(1)) else {
        return VendorResult::not_found(VENDOR_ID);
    };
    let item = item.as_str();

    let model_re =
        Regex::new(r#"(?s)<span[^>]*class="[^"]*product-model[^"]*"[^>]*>(.*?)</span>"#)
            .expect("valid regex");
    let matches_mpn = model_re
        .captures(item)
        .and_then(|c| c.get(1))
        .map(|m| strip_tags(m.as_str()))
        .is_some_and(|model| model == mpn);
    if !matches_mpn {
        return VendorResult::not_found(VENDOR_ID);
    }

    let price_re = Regex::new(r#"(?s)<div[^>]*class="[^"]*price[^"]*"[^>]*>(.*?)</div>"#)
        .expect("valid regex");
    let Some(price) = price_re
        .captures(item)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price(&strip_tags(m.as_str())))
    else {
        return VendorResult::not_found(VENDOR_ID);
    };

    let link_re =
        Regex::new(r#"<a[^>]*class="[^"]*product-title[^"]*"[^>]*href="([^"]+)""#)
            .expect("valid regex");
    let product_url = link_re.captures(item).and_then(|c| c.get(1)).map_or_else(
        || search_url.to_string(),
        |m| {
            let href = m.as_str();
            if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{base_url}{href}")
            }
        },
    );

    VendorResult::found(VENDOR_ID, product_url, mpn.to_string(), price, None, None)
        .unwrap_or_else(|| VendorResult::not_found(VENDOR_ID))
}
