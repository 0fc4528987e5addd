//! Per-call gas accounting and running bot statistics.
//!
//! Gas here is a deterministic cost model for monitoring; nothing is charged
//! to any balance.

use crate::errors::AppError;
use crate::models::TradeRecord;
use alloy_primitives::{Address, U256};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Primitive operations the meter prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasOp {
    BaseCall,
    StorageRead,
    StorageWrite,
    /// Write that leaves the slot unchanged.
    StorageNoop,
    TokenTransfer,
    NativeTransfer,
    ExternalQuote,
    ExternalSwap,
    Event,
}

impl GasOp {
    pub const fn cost(self) -> u64 {
        match self {
            GasOp::BaseCall => 21_000,
            GasOp::StorageRead => 2_100,
            GasOp::StorageWrite => 20_000,
            GasOp::StorageNoop => 2_900,
            GasOp::TokenTransfer => 30_000,
            GasOp::NativeTransfer => 9_000,
            GasOp::ExternalQuote => 15_000,
            GasOp::ExternalSwap => 60_000,
            GasOp::Event => 3_000,
        }
    }
}

/// Accumulates gas for a single call. Starts with the base call cost.
#[derive(Debug, Clone)]
pub struct GasMeter {
    used: u64,
}

impl GasMeter {
    pub fn start() -> Self {
        Self {
            used: GasOp::BaseCall.cost(),
        }
    }

    pub fn charge(&mut self, op: GasOp) {
        self.used = self.used.saturating_add(op.cost());
    }

    pub fn charge_n(&mut self, op: GasOp, times: u64) {
        self.used = self.used.saturating_add(op.cost().saturating_mul(times));
    }

    pub fn used(&self) -> u64 {
        self.used
    }
}

impl Default for GasMeter {
    fn default() -> Self {
        Self::start()
    }
}

/// Running statistics for one bot instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BotMetrics {
    pub calls: usize,
    pub snipes_executed: usize,
    /// Rejected calls by error kind.
    pub rejections: BTreeMap<&'static str, usize>,
    /// Realised profit retained in custody, per token.
    pub realized_profit: BTreeMap<Address, U256>,
    pub withdrawals: usize,
    pub total_gas_used: u64,
}

impl BotMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&mut self, gas_used: u64) {
        self.calls += 1;
        self.total_gas_used = self.total_gas_used.saturating_add(gas_used);
    }

    pub fn record_trade(&mut self, record: &TradeRecord, gas_used: u64) {
        self.record_call(gas_used);
        self.snipes_executed += 1;
        if record.profit.is_positive() {
            let total = self.realized_profit.entry(record.token_in).or_default();
            *total = total.saturating_add(record.profit.into_raw());
        }
    }

    pub fn record_rejection(&mut self, error: &AppError, gas_used: u64) {
        self.record_call(gas_used);
        *self.rejections.entry(error.kind()).or_default() += 1;
    }

    pub fn record_withdrawal(&mut self, gas_used: u64) {
        self.record_call(gas_used);
        self.withdrawals += 1;
    }

    pub fn rejected(&self) -> usize {
        self.rejections.values().sum()
    }

    /// Human-readable summary for periodic logging.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "calls={} snipes={} rejected={} withdrawals={} gas={}",
            self.calls,
            self.snipes_executed,
            self.rejected(),
            self.withdrawals,
            self.total_gas_used
        );
        for (kind, count) in &self.rejections {
            let _ = writeln!(out, "  rejected[{kind}]={count}");
        }
        for (token, profit) in &self.realized_profit {
            let _ = writeln!(out, "  profit[{token}]={profit}");
        }
        out
    }
}
