use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places carried by [`Dec`].
pub const PRECISION: usize = 18;

const ONE_RAW: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("divide by zero")]
    DivisionByZero,
    #[error("invalid decimal '{0}'")]
    Parse(String),
}

/// An unsigned decimal with 18 fractional digits.
///
/// The value is stored as `raw / 10^18` inside a `U256`, which is wide enough
/// for any gas price times any gas limit the pipeline deals with. Gas prices
/// arrive in configuration as strings (`"0.25"`, `"20000000000"`), so `Dec`
/// (de)serializes through its decimal string form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(U256);

impl Dec {
    pub const ZERO: Self = Self(U256::ZERO);

    pub const ONE: Self = Self(ONE_RAW);

    /// Wrap a raw value already scaled by `10^18`.
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    /// Create a `Dec` holding the integer `value` (becomes `value.0`).
    pub fn from_int(value: U256) -> Result<Self, MathError> {
        value
            .checked_mul(ONE_RAW)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn from_u64(value: u64) -> Self {
        // u64::MAX * 10^18 fits comfortably in 256 bits
        Self(U256::from(value) * ONE_RAW)
    }

    /// Create a `Dec` from `numerator / denominator`, truncating past 18 digits.
    pub fn from_ratio(numerator: U256, denominator: U256) -> Result<Self, MathError> {
        if denominator.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        let scaled = numerator
            .checked_mul(ONE_RAW)
            .ok_or(MathError::Overflow)?;
        Ok(Self(scaled / denominator))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by an integer amount, keeping the fractional part.
    pub fn checked_mul_int(&self, rhs: U256) -> Result<Self, MathError> {
        self.0
            .checked_mul(rhs)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn checked_add(&self, rhs: Self) -> Result<Self, MathError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    /// Integer part, rounding any fractional remainder up.
    pub fn ceil_int(&self) -> U256 {
        let whole = self.0 / ONE_RAW;
        if (self.0 % ONE_RAW).is_zero() {
            whole
        } else {
            whole + U256::from(1u8)
        }
    }

    /// Integer part, discarding the fractional remainder.
    pub fn trunc_int(&self) -> U256 {
        self.0 / ONE_RAW
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / ONE_RAW;
        let frac = (self.0 % ONE_RAW).to_string();
        write!(f, "{whole}.{frac:0>width$}", width = PRECISION)
    }
}

impl FromStr for Dec {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || MathError::Parse(s.to_string());

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > PRECISION
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10).map_err(|_| invalid())?
        };
        let frac = if frac.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{frac:0<width$}", width = PRECISION);
            U256::from_str_radix(&padded, 10).map_err(|_| invalid())?
        };

        Self::from_int(whole)?
            .checked_add(Self(frac))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Int(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Int(v) => Ok(Self::from_u64(v)),
        }
    }
}
