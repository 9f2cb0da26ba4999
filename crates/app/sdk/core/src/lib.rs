//! Core types shared by every admission crate: typed rejections, coin
//! amounts and ledger events.

pub mod coins;
pub mod error;
pub mod events;

pub use alloy_primitives::{Address, B256, U256};
pub use coins::{Coin, Coins, DecCoin, DecCoins, IntoAmount};
pub use error::{AnteError, AnteResult, ErrorKind};
pub use events::{Event, EventAttribute};
pub use tollgate_math::{Dec, MathError};

/// A macro that ensures a condition holds true. If not, returns an error.
///
/// # Usage
///
/// ```rust
/// use tollgate_core::{ensure, AnteError, AnteResult, ErrorKind};
///
/// fn example_function(gas: u64) -> AnteResult<()> {
///     ensure!(
///         gas > 0,
///         AnteError::new(ErrorKind::InvalidGasLimit, "must provide positive gas")
///     );
///     Ok(())
/// }
///
/// assert!(example_function(1).is_ok());
/// assert!(example_function(0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
