//! Periodic scan loop: price each configured pair and snipe when it clears.

use crate::bot::SnipingBot;
use crate::config::{ResolvedPair, ScanConfig};
use crate::errors::AppError;
use crate::ledger::Ledger;
use alloy_primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Bot and ledger mutated together under one lock.
#[derive(Debug)]
pub struct Session {
    pub bot: SnipingBot,
    pub ledger: Ledger,
}

impl Session {
    pub fn new(bot: SnipingBot, ledger: Ledger) -> Self {
        Self { bot, ledger }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub rounds: u64,
    pub evaluated: u64,
    pub executed: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Spawn the scan loop. Finishes after `scan.rounds` ticks, or never when
/// `rounds` is zero.
pub fn spawn_snipe_loop(
    session: Arc<Mutex<Session>>,
    caller: Address,
    pairs: Vec<ResolvedPair>,
    scan: ScanConfig,
) -> JoinHandle<ScanSummary> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(scan.interval_ms.max(1)));
        let heartbeat_every = scan.heartbeat_every.max(1);
        let mut summary = ScanSummary::default();

        while scan.rounds == 0 || summary.rounds < scan.rounds {
            ticker.tick().await;
            summary.rounds += 1;

            let mut guard = session.lock().await;
            let Session { bot, ledger } = &mut *guard;
            let mut hits = 0u64;

            for pair in &pairs {
                summary.evaluated += 1;
                let profit = match bot.check_price_arbitrage(
                    ledger,
                    pair.token_in,
                    pair.token_out,
                    pair.amount_in,
                ) {
                    Ok(profit) => profit,
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(
                            token_in = %pair.token_in,
                            token_out = %pair.token_out,
                            error = %e,
                            "[SCAN] pricing failed"
                        );
                        continue;
                    }
                };

                match bot.config().arbitrage.accepts(profit, pair.amount_in) {
                    Ok(true) => {}
                    Ok(false) => {
                        summary.skipped += 1;
                        continue;
                    }
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(
                            token_in = %pair.token_in,
                            token_out = %pair.token_out,
                            error = %e,
                            "[SCAN] margin check failed"
                        );
                        continue;
                    }
                }

                match bot.execute_snipe(
                    ledger,
                    caller,
                    pair.token_in,
                    pair.token_out,
                    pair.amount_in,
                ) {
                    Ok(_) => {
                        hits += 1;
                        summary.executed += 1;
                    }
                    Err(AppError::InsufficientProfitMargin { .. }) => summary.skipped += 1,
                    Err(_) => summary.failed += 1,
                }
            }

            if hits > 0 {
                tracing::info!(round = summary.rounds, hits, "[SCAN] snipes executed");
            } else if summary.rounds % heartbeat_every == 0 {
                tracing::info!(
                    round = summary.rounds,
                    pairs = pairs.len(),
                    executed = summary.executed,
                    gas = bot.metrics().total_gas_used,
                    "[HEARTBEAT] no snipes above threshold"
                );
            }
        }

        tracing::info!(?summary, "[SCAN] loop finished");
        summary
    })
}
