//! Vendor-specific adapters.
//!
//! Each module owns the search/validate/extract micro-rules for one
//! retailer. Vendors with unreliable plain-HTTP access also provide a
//! rendered variant that the registry wraps in a [`crate::FallbackAdapter`].

mod digicor;
mod ebay;
mod jwcomputers;
mod mwave;
mod pccasegear;
mod scorptec;
mod umart;

pub use digicor::DigicorAdapter;
pub use ebay::EbayAdapter;
pub use jwcomputers::JwComputersAdapter;
pub use mwave::MwaveAdapter;
pub use pccasegear::{PcCaseGearAdapter, PcCaseGearRenderedAdapter};
pub use scorptec::{ScorptecAdapter, ScorptecRenderedAdapter};
pub use umart::{UmartAdapter, UmartRenderedAdapter};
