use crate::ledger::Ledger;
use alloy_primitives::{Address, U256};

/// Reserve snapshot of one venue for a directed pair, read from the ledger.
///
/// A venue's reserves are simply its own token balances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolReserves {
    pub token_in: Address,
    pub token_out: Address,
    pub reserve_in: U256,
    pub reserve_out: U256,
}

impl PoolReserves {
    pub fn read(ledger: &Ledger, venue: Address, token_in: Address, token_out: Address) -> Self {
        Self {
            token_in,
            token_out,
            reserve_in: ledger.balance_of(token_in, venue),
            reserve_out: ledger.balance_of(token_out, venue),
        }
    }

    /// Both sides hold liquidity.
    pub fn is_live(&self) -> bool {
        !self.reserve_in.is_zero() && !self.reserve_out.is_zero()
    }
}
