//! Log output for nodes running the admission pipeline.

pub mod logging;

pub use logging::{init_tracing, init_tracing_from_config, parse_level, LogFormat};
