use super::types::Opportunity;
use crate::dex::{LiquiditySource, signed_delta};
use crate::errors::Result;
use crate::ledger::Ledger;
use alloy_primitives::{Address, I256, U256, address};
use std::sync::Arc;
use tracing::debug;

/// Scratch account used to replay the buy leg when pricing the sell leg.
const SIMULATION_ACCOUNT: Address = address!("0x000000000000000000000000000000000051a7e5");

/// Prices a round trip: buy `token_out` on one venue, sell it back on another.
///
/// Both venues may be the same object. Whitelist checks are the caller's job.
#[derive(Debug, Clone)]
pub struct ArbitrageEvaluator {
    buy_venue: Arc<dyn LiquiditySource>,
    sell_venue: Arc<dyn LiquiditySource>,
}

impl ArbitrageEvaluator {
    pub fn new(buy_venue: Arc<dyn LiquiditySource>, sell_venue: Arc<dyn LiquiditySource>) -> Self {
        Self {
            buy_venue,
            sell_venue,
        }
    }

    pub fn buy_venue(&self) -> &dyn LiquiditySource {
        self.buy_venue.as_ref()
    }

    pub fn sell_venue(&self) -> &dyn LiquiditySource {
        self.sell_venue.as_ref()
    }

    /// Signed round-trip profit in `token_in` base units.
    pub fn estimate_profit(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<I256> {
        Ok(self
            .evaluate(ledger, token_in, token_out, amount_in)?
            .expected_profit)
    }

    /// Quote both legs against the current ledger.
    ///
    /// The sell leg is quoted on a scratch copy with the buy leg applied, so a
    /// venue used for both legs sees its own price impact.
    pub fn evaluate(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<Opportunity> {
        let amount_mid = self
            .buy_venue
            .quote(ledger, token_in, token_out, amount_in)?;

        let amount_out = if amount_mid.is_zero() {
            U256::ZERO
        } else {
            let mut scratch = ledger.clone();
            scratch.mint(token_in, SIMULATION_ACCOUNT, amount_in)?;
            self.buy_venue.swap(
                &mut scratch,
                SIMULATION_ACCOUNT,
                token_in,
                token_out,
                amount_in,
                amount_mid,
            )?;
            self.sell_venue
                .quote(&scratch, token_out, token_in, amount_mid)?
        };

        let expected_profit = signed_delta(amount_out, amount_in);
        debug!(
            buy = self.buy_venue.name(),
            sell = self.sell_venue.name(),
            %amount_in,
            %amount_mid,
            %amount_out,
            %expected_profit,
            "[EVAL] round trip priced"
        );

        Ok(Opportunity {
            token_in,
            token_out,
            amount_in,
            amount_mid,
            amount_out,
            expected_profit,
        })
    }
}
