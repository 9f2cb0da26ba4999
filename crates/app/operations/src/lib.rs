//! Operational glue for nodes running the admission pipeline.
//!
//! - **Config**: YAML configuration with validation that reports every
//!   problem at once
//! - **Observability**: `tracing-subscriber` initialisation
//! - **Startup**: building the [`tollgate_ante::AnteHandler`] from config
//!
//! # Example
//!
//! ```no_run
//! use tollgate_operations::{build_ante_handler, init_tracing_from_config, load_config};
//! # fn keepers() -> tollgate_ante::Keepers { unimplemented!() }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("tollgate.yaml")?;
//!     init_tracing_from_config(&config.observability).map_err(|e| e.to_string())?;
//!     let handler = build_ante_handler(&config, keepers())?;
//!     # let _ = handler;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod observability;
pub mod startup;

pub use config::{load_config, load_config_from_str, NodeConfig, ObservabilityConfig};
pub use errors::ConfigError;
pub use observability::{init_tracing, init_tracing_from_config, parse_level, LogFormat};
pub use startup::build_ante_handler;
