//! Liquidity sources the bot quotes and swaps against.
//!
//! The executor only sees the [`LiquiditySource`] trait; the two in-process
//! venues in [`client`] stand in for real routers.

use crate::errors::{AppError, Result};
use crate::ledger::Ledger;
use alloy_primitives::{Address, U256};
use std::fmt;
use tracing::debug;

pub mod calc;
pub mod client;
pub mod state;

pub use calc::{apply_bps, get_amount_out, min_out_after_slippage, signed_delta};
pub use client::{ConstantProductVenue, FixedRateVenue};
pub use state::PoolReserves;

/// A venue that can price and fill exact-input swaps.
///
/// `quote` must be a pure read of the ledger. `swap` must either move
/// `amount_in` of `token_in` from the trader to the venue and the returned
/// amount of `token_out` back, or fail without touching the ledger.
pub trait LiquiditySource: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Ledger account holding the venue's reserves.
    fn address(&self) -> Address;

    fn quote(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256>;

    fn swap(
        &self,
        ledger: &mut Ledger,
        trader: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
    ) -> Result<U256> {
        let amount_out = self.quote(ledger, token_in, token_out, amount_in)?;
        if amount_out < min_amount_out {
            return Err(AppError::ExternalSwapFailure(format!(
                "{}: output {amount_out} below minimum {min_amount_out}",
                self.name()
            )));
        }

        let venue = self.address();
        ledger.transact(|l| {
            l.transfer(token_in, trader, venue, amount_in)?;
            l.transfer(token_out, venue, trader, amount_out)
                .map_err(|e| AppError::ExternalSwapFailure(format!("{}: {e}", self.name())))
        })?;

        debug!(
            venue = self.name(),
            %token_in,
            %token_out,
            %amount_in,
            %amount_out,
            "[DEX] swap filled"
        );
        Ok(amount_out)
    }
}

/// Shared pair validation for venue quotes.
pub(crate) fn ensure_pair(venue: &str, token_in: Address, token_out: Address) -> Result<()> {
    if token_in.is_zero() || token_out.is_zero() {
        return Err(AppError::InvalidToken);
    }
    if token_in == token_out {
        return Err(AppError::ExternalSwapFailure(format!(
            "{venue}: identical tokens {token_in}"
        )));
    }
    Ok(())
}
