//! Coin amounts as carried in fees, balances and rewards.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use tollgate_math::Dec;

use crate::error::{AnteError, AnteResult, ErrorKind};

/// Unsigned integers a coin amount can be built from.
///
/// `U256` only offers fallible conversions from the primitive integers, so
/// the lossless ones are spelled out here.
pub trait IntoAmount {
    fn into_amount(self) -> U256;
}

impl IntoAmount for U256 {
    fn into_amount(self) -> U256 {
        self
    }
}

impl IntoAmount for u64 {
    fn into_amount(self) -> U256 {
        U256::from_limbs([self, 0, 0, 0])
    }
}

impl IntoAmount for u128 {
    fn into_amount(self) -> U256 {
        U256::from_limbs([self as u64, (self >> 64) as u64, 0, 0])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: U256,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl IntoAmount) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into_amount(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A normalized set of coins: sorted by denom, one entry per denom, no zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new(coins: impl IntoIterator<Item = Coin>) -> Self {
        let mut out = Self::default();
        for coin in coins {
            out.insert(coin);
        }
        out
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(denom: impl Into<String>, amount: impl IntoAmount) -> Self {
        Self::new([Coin::new(denom, amount)])
    }

    fn insert(&mut self, coin: Coin) {
        if coin.is_zero() {
            return;
        }
        match self.0.binary_search_by(|c| c.denom.as_str().cmp(&coin.denom)) {
            Ok(idx) => {
                if let Some(existing) = self.0.get_mut(idx) {
                    existing.amount = existing.amount.saturating_add(coin.amount);
                }
            }
            Err(idx) => self.0.insert(idx, coin),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalized coins never hold zero entries, so empty means zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn amount_of(&self, denom: &str) -> U256 {
        self.find(denom).map(|c| c.amount).unwrap_or(U256::ZERO)
    }

    pub fn find(&self, denom: &str) -> Option<&Coin> {
        self.0.iter().find(|c| c.denom == denom)
    }

    pub fn checked_add(&self, other: &Coins) -> AnteResult<Coins> {
        let mut out = self.clone();
        for coin in other.iter() {
            let current = out.amount_of(&coin.denom);
            let sum = current.checked_add(coin.amount).ok_or_else(|| {
                AnteError::new(ErrorKind::InvalidRequest, format!("coin overflow: {coin}"))
            })?;
            out.set(&coin.denom, sum);
        }
        Ok(out)
    }

    /// Subtract `other`, failing with `InsufficientFunds` if any denom would go negative.
    pub fn checked_sub(&self, other: &Coins) -> AnteResult<Coins> {
        let mut out = self.clone();
        for coin in other.iter() {
            let current = out.amount_of(&coin.denom);
            let rest = current.checked_sub(coin.amount).ok_or_else(|| {
                AnteError::new(
                    ErrorKind::InsufficientFunds,
                    format!("{current}{} is smaller than {coin}", coin.denom),
                )
            })?;
            out.set(&coin.denom, rest);
        }
        Ok(out)
    }

    fn set(&mut self, denom: &str, amount: U256) {
        self.0.retain(|c| c.denom != denom);
        self.insert(Coin::new(denom, amount));
    }

    /// True if, for at least one denom in `other`, this set holds a non-zero
    /// amount that is at least as large.
    pub fn is_any_gte(&self, other: &Coins) -> bool {
        other.iter().any(|coin| {
            let held = self.amount_of(&coin.denom);
            !held.is_zero() && held >= coin.amount
        })
    }

    /// True if this set holds at least every amount in `other`.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.iter().all(|coin| self.amount_of(&coin.denom) >= coin.amount)
    }
}

impl From<Vec<Coin>> for Coins {
    fn from(coins: Vec<Coin>) -> Self {
        Self::new(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}

/// A per-denom price such as a validator's minimum gas price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: Dec,
}

impl DecCoin {
    pub fn new(denom: impl Into<String>, amount: Dec) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecCoins(Vec<DecCoin>);

impl DecCoins {
    pub fn new(coins: impl IntoIterator<Item = DecCoin>) -> Self {
        let mut coins: Vec<DecCoin> = coins.into_iter().filter(|c| !c.amount.is_zero()).collect();
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        coins.dedup_by(|a, b| a.denom == b.denom);
        Self(coins)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn amount_of(&self, denom: &str) -> Dec {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(Dec::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecCoin> {
        self.0.iter()
    }
}
