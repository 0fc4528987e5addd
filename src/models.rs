//! Shared data structures used throughout the application.

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

/// `TradeExecuted` event payload, one per successful snipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trader: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    /// `token_out` received on the buy leg.
    pub amount_mid: U256,
    /// `token_in` received back on the sell leg.
    pub amount_out: U256,
    pub profit: I256,
    pub timestamp: u64,
}

/// Outcome of one bot call together with what it cost and emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt<T> {
    pub value: T,
    /// Gas-equivalent units consumed by the call.
    pub gas_used: u64,
    pub events: Vec<TradeRecord>,
}

impl<T> Receipt<T> {
    pub fn new(value: T, gas_used: u64) -> Self {
        Self {
            value,
            gas_used,
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, record: TradeRecord) -> Self {
        self.events.push(record);
        self
    }
}

/// Per-call lifecycle of a snipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnipePhase {
    Idle,
    Validating,
    Swapping,
    Settled,
    Rejected,
}
