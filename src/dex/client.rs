use crate::dex::calc::{apply_bps, get_amount_out};
use crate::dex::state::PoolReserves;
use crate::dex::{LiquiditySource, ensure_pair};
use crate::errors::{AppError, Result};
use crate::ledger::Ledger;
use alloy_primitives::{Address, U256};
use std::collections::HashMap;

/// x*y=k venue whose reserves are its own ledger balances.
#[derive(Clone, Debug)]
pub struct ConstantProductVenue {
    name: String,
    address: Address,
    /// Liquidity-provider fee in basis points (30 = 0.3%).
    fee_bps: u32,
}

impl ConstantProductVenue {
    pub fn new(name: impl Into<String>, address: Address, fee_bps: u32) -> Self {
        Self {
            name: name.into(),
            address,
            fee_bps,
        }
    }
}

impl LiquiditySource for ConstantProductVenue {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Address {
        self.address
    }

    fn quote(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256> {
        ensure_pair(&self.name, token_in, token_out)?;
        let reserves = PoolReserves::read(ledger, self.address, token_in, token_out);
        if !reserves.is_live() {
            return Err(AppError::ExternalSwapFailure(format!(
                "{}: no liquidity for {token_in} -> {token_out}",
                self.name
            )));
        }
        get_amount_out(
            amount_in,
            reserves.reserve_in,
            reserves.reserve_out,
            self.fee_bps,
        )
    }
}

/// Venue quoting a fixed rate per direction, paid from its ledger balance.
///
/// A rate of 10_000 bps is 1:1; 10_100 bps returns 1% more than the input.
#[derive(Clone, Debug)]
pub struct FixedRateVenue {
    name: String,
    address: Address,
    rates: HashMap<(Address, Address), u32>,
}

impl FixedRateVenue {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            rates: HashMap::new(),
        }
    }

    /// Set the rate for `token_in -> token_out`.
    pub fn with_rate(mut self, token_in: Address, token_out: Address, rate_bps: u32) -> Self {
        self.rates.insert((token_in, token_out), rate_bps);
        self
    }

    pub fn rate_bps(&self, token_in: Address, token_out: Address) -> Option<u32> {
        self.rates.get(&(token_in, token_out)).copied()
    }
}

impl LiquiditySource for FixedRateVenue {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Address {
        self.address
    }

    fn quote(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256> {
        ensure_pair(&self.name, token_in, token_out)?;
        let rate = self.rate_bps(token_in, token_out).ok_or_else(|| {
            AppError::ExternalSwapFailure(format!(
                "{}: no rate for {token_in} -> {token_out}",
                self.name
            ))
        })?;

        let amount_out = apply_bps(amount_in, rate)?;
        let available = ledger.balance_of(token_out, self.address);
        if amount_out > available {
            return Err(AppError::ExternalSwapFailure(format!(
                "{}: insufficient liquidity, {amount_out} requested, {available} held",
                self.name
            )));
        }
        Ok(amount_out)
    }
}
