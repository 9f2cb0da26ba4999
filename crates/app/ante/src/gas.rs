use tollgate_core::{ante_err, AnteResult};

/// Tracks gas consumed by a transaction during admission.
///
/// - **Basic** mode: rejects any consumption that would exceed `limit`.
/// - **InfiniteWithLimit** mode: never rejects. `limit` is only reported as
///   the transaction's gas wanted.
///
/// # Examples
///
/// ```
/// use tollgate_ante::gas::GasMeter;
///
/// let mut meter = GasMeter::basic(1000);
/// meter.consume_gas(200, "txSize").unwrap();
/// assert!(meter.consume_gas(10_000, "txSize").is_err());
/// assert_eq!(meter.gas_consumed(), 200);
///
/// let mut infinite = GasMeter::infinite_with_limit(50);
/// infinite.consume_gas(9_999_999, "anything").unwrap();
/// assert_eq!(infinite.limit(), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GasMeter {
    Basic { limit: u64, consumed: u64 },
    InfiniteWithLimit { limit: u64, consumed: u64 },
}

impl GasMeter {
    pub fn basic(limit: u64) -> Self {
        Self::Basic { limit, consumed: 0 }
    }

    /// An infinite meter reporting `limit` as gas wanted.
    pub fn infinite_with_limit(limit: u64) -> Self {
        Self::InfiniteWithLimit { limit, consumed: 0 }
    }

    pub fn infinite() -> Self {
        Self::infinite_with_limit(u64::MAX)
    }

    /// Consume `amount` gas, attributing it to `descriptor` on failure.
    ///
    /// # Errors
    ///
    /// Returns `OutOfGas` if a basic meter would exceed its limit. The
    /// meter is left unchanged in that case.
    pub fn consume_gas(&mut self, amount: u64, descriptor: &str) -> AnteResult<()> {
        match self {
            Self::Basic { limit, consumed } => {
                let next = consumed.saturating_add(amount);
                if next > *limit {
                    return Err(ante_err!(
                        OutOfGas,
                        "out of gas in location: {descriptor}; gasWanted: {limit}, gasUsed: {next}"
                    ));
                }
                *consumed = next;
                Ok(())
            }
            Self::InfiniteWithLimit { consumed, .. } => {
                *consumed = consumed.saturating_add(amount);
                Ok(())
            }
        }
    }

    pub fn gas_consumed(&self) -> u64 {
        match self {
            Self::Basic { consumed, .. } | Self::InfiniteWithLimit { consumed, .. } => *consumed,
        }
    }

    pub fn limit(&self) -> u64 {
        match self {
            Self::Basic { limit, .. } | Self::InfiniteWithLimit { limit, .. } => *limit,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::InfiniteWithLimit { .. })
    }

    /// Gas left before a basic meter rejects; `u64::MAX` for infinite meters.
    pub fn gas_remaining(&self) -> u64 {
        match self {
            Self::Basic { limit, consumed } => limit.saturating_sub(*consumed),
            Self::InfiniteWithLimit { .. } => u64::MAX,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tollgate_core::ErrorKind;

    fn proptest_cases() -> u32 {
        const DEFAULT_CASES: u32 = 64;
        const CI_CASES: u32 = 32;

        if let Ok(value) = std::env::var("TOLLGATE_PROPTEST_CASES") {
            if let Ok(parsed) = value.parse::<u32>() {
                if parsed > 0 {
                    return parsed;
                }
            }
        }
        if std::env::var("CI").is_ok() {
            return CI_CASES;
        }
        DEFAULT_CASES
    }

    fn proptest_config() -> proptest::test_runner::Config {
        proptest::test_runner::Config {
            cases: proptest_cases(),
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_meter_rejects_past_limit() {
        let mut meter = GasMeter::basic(100);
        meter.consume_gas(60, "a").unwrap();
        let err = meter.consume_gas(41, "txSize").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfGas);
        assert!(err.reason().contains("txSize"));
        assert_eq!(meter.gas_consumed(), 60);
        assert_eq!(meter.gas_remaining(), 40);

        meter.consume_gas(40, "b").unwrap();
        assert_eq!(meter.gas_remaining(), 0);
    }

    #[test]
    fn test_infinite_meter_saturates() {
        let mut meter = GasMeter::infinite_with_limit(10);
        meter.consume_gas(u64::MAX, "a").unwrap();
        meter.consume_gas(5, "b").unwrap();
        assert_eq!(meter.gas_consumed(), u64::MAX);
        assert_eq!(meter.limit(), 10);
        assert!(meter.is_infinite());
    }

    #[test]
    fn test_zero_limit_basic_meter_accepts_zero() {
        let mut meter = GasMeter::basic(0);
        meter.consume_gas(0, "noop").unwrap();
        assert!(meter.consume_gas(1, "one").is_err());
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn prop_basic_meter_model(
            limit in 0u64..=5_000,
            ops in prop::collection::vec(0u64..=1_500, 0..32),
        ) {
            let mut meter = GasMeter::basic(limit);
            let mut expected = 0u64;

            for amount in ops {
                let next = expected.saturating_add(amount);
                let result = meter.consume_gas(amount, "prop");
                if next > limit {
                    prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::OutOfGas);
                } else {
                    prop_assert!(result.is_ok());
                    expected = next;
                }
                prop_assert_eq!(meter.gas_consumed(), expected);
                prop_assert_eq!(meter.gas_remaining(), limit - expected);
            }
        }
    }
}
