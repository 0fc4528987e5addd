use crate::dex::calc::apply_bps;
use crate::errors::Result;
use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

/// Thresholds for accepting a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    /// Absolute minimum profit, in `token_in` base units.
    pub min_profit: U256,
    /// Minimum profit relative to `amount_in`, in basis points.
    pub min_profit_bps: u32,
    /// Tolerated shortfall against each leg's quote, in basis points.
    pub slippage_bps: u32,
}

impl ArbitrageConfig {
    /// Profit a trade of `amount_in` must reach: the larger of the two floors.
    pub fn required_profit(&self, amount_in: U256) -> Result<U256> {
        let relative = apply_bps(amount_in, self.min_profit_bps)?;
        Ok(relative.max(self.min_profit))
    }

    /// Whether a signed `profit` clears the floor for `amount_in`.
    pub fn accepts(&self, profit: I256, amount_in: U256) -> Result<bool> {
        if !profit.is_positive() {
            return Ok(false);
        }
        Ok(profit.into_raw() >= self.required_profit(amount_in)?)
    }
}

/// Result of evaluating one round trip. Computed per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opportunity {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    /// Quoted `token_out` from the buy venue.
    pub amount_mid: U256,
    /// Quoted `token_in` back from the sell venue.
    pub amount_out: U256,
    pub expected_profit: I256,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ArbitrageConfig {
        ArbitrageConfig {
            min_profit: U256::from(100u64),
            min_profit_bps: 10,
            slippage_bps: 50,
        }
    }

    #[test]
    fn absolute_floor_applies_to_small_trades() {
        assert_eq!(
            config().required_profit(U256::from(1_000u64)).unwrap(),
            U256::from(100u64)
        );
    }

    #[test]
    fn relative_floor_applies_to_large_trades() {
        assert_eq!(
            config().required_profit(U256::from(1_000_000u64)).unwrap(),
            U256::from(1_000u64)
        );
    }

    #[test]
    fn non_positive_profit_is_never_accepted() {
        let cfg = ArbitrageConfig {
            min_profit: U256::ZERO,
            min_profit_bps: 0,
            slippage_bps: 0,
        };
        assert!(!cfg.accepts(I256::ZERO, U256::from(1u8)).unwrap());
        assert!(!cfg.accepts(I256::MINUS_ONE, U256::from(1u8)).unwrap());
        assert!(cfg.accepts(I256::ONE, U256::from(1u8)).unwrap());
    }
}
