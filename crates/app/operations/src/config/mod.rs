//! Node configuration: YAML loading and validation that collects every
//! error before returning.

mod loader;
pub mod types;
mod validation;

pub use loader::{load_config, load_config_from_str};
pub use types::{ChainConfig, NodeConfig, ObservabilityConfig};
pub use validation::validate_config;
