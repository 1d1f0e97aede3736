pub mod adapter;
pub mod coordinator;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod registry;
pub mod render;
pub mod vendors;

pub use adapter::{FallbackAdapter, VendorAdapter};
pub use coordinator::{PriceScout, ProgressFn};
pub use error::TransportError;
pub use fetch::Fetcher;
pub use registry::{default_registry, ScraperConfig};
pub use render::PageRenderer;
