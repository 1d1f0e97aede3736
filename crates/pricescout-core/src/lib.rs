pub mod app_config;
pub mod config;
pub mod reconcile;
pub mod result;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use reconcile::{cheapest, reconcile, CheapestOffer, ReconcileAction, PRICE_TOLERANCE};
pub use result::{QueryBatchItem, VendorResult, DEFAULT_CURRENCY};
