//! The fixed, ordered vendor registry.

use pricescout_core::AppConfig;

use crate::adapter::{FallbackAdapter, VendorAdapter};
use crate::error::TransportError;
use crate::vendors::{
    DigicorAdapter, EbayAdapter, JwComputersAdapter, MwaveAdapter, PcCaseGearAdapter,
    PcCaseGearRenderedAdapter, ScorptecAdapter, ScorptecRenderedAdapter, UmartAdapter,
    UmartRenderedAdapter,
};

/// Settings every adapter constructor needs.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Budget for plain HTTP adapters.
    pub request_timeout_secs: u64,
    /// Budget for rendering-based adapters; browser startup plus script
    /// execution needs the larger allowance.
    pub render_timeout_secs: u64,
    pub user_agent: String,
    pub browser_bin: String,
}

impl ScraperConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_timeout_secs: config.request_timeout_secs,
            render_timeout_secs: config.render_timeout_secs,
            user_agent: config.user_agent.clone(),
            browser_bin: config.browser_bin.clone(),
        }
    }
}

/// Builds the production vendor registry in its fixed registration order.
///
/// The order is part of the produced surface: coordinator output and
/// downstream table columns follow it. Adding a vendor means appending a
/// new adapter here, nowhere else.
///
/// Vendors whose storefronts intermittently block plain HTTP get a
/// rendered fallback wrapped around the cheap path.
///
/// # Errors
///
/// Returns [`TransportError::Http`] if an HTTP client cannot be built.
pub fn default_registry(
    config: &ScraperConfig,
) -> Result<Vec<Box<dyn VendorAdapter>>, TransportError> {
    let adapters: Vec<Box<dyn VendorAdapter>> = vec![
        Box::new(DigicorAdapter::new(config)?),
        Box::new(FallbackAdapter::new(
            Box::new(ScorptecAdapter::new(config)?),
            Box::new(ScorptecRenderedAdapter::new(config)),
        )),
        Box::new(MwaveAdapter::new(config)?),
        Box::new(FallbackAdapter::new(
            Box::new(PcCaseGearAdapter::new(config)?),
            Box::new(PcCaseGearRenderedAdapter::new(config)),
        )),
        Box::new(JwComputersAdapter::new(config)?),
        Box::new(FallbackAdapter::new(
            Box::new(UmartAdapter::new(config)?),
            Box::new(UmartRenderedAdapter::new(config)),
        )),
        Box::new(EbayAdapter::new(config)?),
    ];
    Ok(adapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ScraperConfig {
        ScraperConfig {
            request_timeout_secs: 5,
            render_timeout_secs: 10,
            user_agent: "pricescout-test/0.1".to_string(),
            browser_bin: "chromium".to_string(),
        }
    }

    #[test]
    fn registry_order_is_stable() {
        let registry = default_registry(&test_config()).expect("clients build");
        let ids: Vec<&str> = registry.iter().map(|a| a.vendor_id()).collect();
        assert_eq!(
            ids,
            vec![
                "digicor",
                "scorptec",
                "mwave",
                "pccasegear",
                "jw_computers",
                "umart",
                "ebay_au",
            ]
        );
    }
}
