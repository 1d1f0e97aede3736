//! Scorptec (www.scorptec.com.au).
//!
//! The search endpoint redirects straight to the product page when a query
//! matches a single item, so the search response doubles as the
//! authoritative product page: model number and price are read from it
//! directly. The storefront sits behind Cloudflare, so the plain HTTP
//! adapter is registry-wrapped with a rendered fallback.

use async_trait::async_trait;
use pricescout_core::VendorResult;
use regex::Regex;

use crate::adapter::VendorAdapter;
use crate::error::TransportError;
use crate::fetch::Fetcher;
use crate::parse::parse_price;
use crate::registry::ScraperConfig;
use crate::render::PageRenderer;

const VENDOR_ID: &str = "scorptec";
const BASE_URL: &str = "https://www.scorptec.com.au";

pub struct ScorptecAdapter {
    fetcher: Fetcher,
    base_url: String,
}

impl ScorptecAdapter {
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
impl VendorAdapter for ScorptecAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let url = search_url(&self.base_url, mpn);
        let html = self.fetcher.get_html(&url).await?;
        Ok(parse_product_page(&html, mpn, &url))
    }
}

/// Rendered fallback: same page, fetched through an isolated headless
/// browser when the anti-bot layer rejects the plain request.
pub struct ScorptecRenderedAdapter {
    renderer: PageRenderer,
    base_url: String,
}

impl ScorptecRenderedAdapter {
    #[must_use]
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            renderer: PageRenderer::new(&config.browser_bin, config.render_timeout_secs),
            base_url: BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl VendorAdapter for ScorptecRenderedAdapter {
    fn vendor_id(&self) -> &'static str {
        VENDOR_ID
    }

    async fn lookup(&self, mpn: &str) -> Result<VendorResult, TransportError> {
        let url = search_url(&self.base_url, mpn);
        let html = self.renderer.render(&url).await?;
        Ok(parse_product_page(&html, mpn, &url))
    }
}

fn search_url(base_url: &str, mpn: &str) -> String {
    format!("{base_url}/search/go?w={mpn}&cnt=1")
}

/// Validates the page's own model-number field (case-sensitive exact
/// match) and extracts the main price.
fn parse_product_page(html: &str, mpn: &str, url: &str) -> VendorResult {
    let model_re =
        Regex::new(r#"class="product-page-model"[^>]*>\s*([^<]+?)\s*<"#).expect("valid regex");
    let Some(model) = model_re.captures(html).and_then(|c| c.get(1)) else {
        return VendorResult::not_found(VENDOR_ID);
    };
    if model.as_str() != mpn {
        return VendorResult::not_found(VENDOR_ID);
    }

    let price_re = Regex::new(
        r#"class="product-page-price product-main-price"[^>]*>\s*([^<]+?)\s*<"#,
    )
    .expect("valid regex");
    let Some(price) = price_re
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_price(m.as_str()))
    else {
        return VendorResult::not_found(VENDOR_ID);
    };

    VendorResult::found(VENDOR_ID, url.to_string(), mpn.to_string(), price, None, None)
        .unwrap_or_else(|| VendorResult::not_found(VENDOR_ID))
}
