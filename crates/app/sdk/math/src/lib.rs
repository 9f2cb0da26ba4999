//! Fixed-point arithmetic for gas prices and fee amounts.

pub mod dec;

pub use dec::{Dec, MathError, PRECISION};
