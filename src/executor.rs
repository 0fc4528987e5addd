//! Atomic two-leg snipe execution.

use crate::arbitrage::Opportunity;
use crate::bot::SnipingBot;
use crate::dex::{min_out_after_slippage, signed_delta};
use crate::errors::{AppError, Result};
use crate::ledger::Ledger;
use crate::metrics::{GasMeter, GasOp};
use crate::models::{Receipt, SnipePhase, TradeRecord};
use crate::utils::unix_now;
use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

fn advance(phase: &mut SnipePhase, next: SnipePhase) {
    debug!(from = ?phase, to = ?next, "[SNIPE] phase");
    *phase = next;
}

impl SnipingBot {
    /// Pull `amount_in` of `token_in` from `caller`, round-trip it through the
    /// buy and sell venues, return the principal and keep the profit.
    ///
    /// Either every transfer happens or none does. Exactly one
    /// `TradeExecuted` record is emitted on success.
    pub fn execute_snipe(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<Receipt<TradeRecord>> {
        let mut meter = GasMeter::start();
        let mut phase = SnipePhase::Idle;

        match self.snipe(ledger, &mut meter, &mut phase, caller, token_in, token_out, amount_in) {
            Ok(record) => {
                meter.charge(GasOp::Event);
                self.emit(&record);
                self.metrics.record_trade(&record, meter.used());
                info!(
                    %caller,
                    %token_in,
                    %token_out,
                    %amount_in,
                    profit = %record.profit,
                    gas_used = meter.used(),
                    "[SNIPE] settled"
                );
                Ok(Receipt::new(record.clone(), meter.used()).with_event(record))
            }
            Err(e) => {
                advance(&mut phase, SnipePhase::Rejected);
                self.metrics.record_rejection(&e, meter.used());
                warn!(
                    %caller,
                    %token_in,
                    %token_out,
                    %amount_in,
                    error = %e,
                    "[SNIPE] rejected"
                );
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn snipe(
        &self,
        ledger: &mut Ledger,
        meter: &mut GasMeter,
        phase: &mut SnipePhase,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<TradeRecord> {
        advance(phase, SnipePhase::Validating);
        meter.charge_n(GasOp::StorageRead, 2);
        self.ensure_tradable(token_in, token_out)?;

        meter.charge(GasOp::StorageRead);
        let approved = ledger.allowance(token_in, caller, self.address);
        if approved < amount_in {
            return Err(AppError::InsufficientAllowance {
                approved,
                required: amount_in,
            });
        }

        meter.charge_n(GasOp::ExternalQuote, 2);
        let opportunity = self
            .evaluator
            .evaluate(ledger, token_in, token_out, amount_in)?;
        let required = self.config.arbitrage.required_profit(amount_in)?;
        if !self
            .config
            .arbitrage
            .accepts(opportunity.expected_profit, amount_in)?
        {
            return Err(AppError::InsufficientProfitMargin {
                profit: opportunity.expected_profit,
                required,
            });
        }

        advance(phase, SnipePhase::Swapping);
        meter.charge_n(GasOp::TokenTransfer, 2);
        meter.charge_n(GasOp::ExternalSwap, 2);
        meter.charge(GasOp::StorageWrite);
        let (amount_mid, amount_out) =
            ledger.transact(|l| self.swap_round_trip(l, caller, &opportunity, required))?;

        advance(phase, SnipePhase::Settled);
        Ok(TradeRecord {
            trader: caller,
            token_in,
            token_out,
            amount_in,
            amount_mid,
            amount_out,
            profit: signed_delta(amount_out, amount_in),
            timestamp: unix_now(),
        })
    }

    /// Both legs and settlement. Runs inside a ledger transaction.
    fn swap_round_trip(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        opportunity: &Opportunity,
        required: U256,
    ) -> Result<(U256, U256)> {
        let Opportunity {
            token_in,
            token_out,
            amount_in,
            ..
        } = *opportunity;
        let slippage = self.config.arbitrage.slippage_bps;
        let bot = self.address;

        ledger.transfer_from(token_in, caller, bot, bot, amount_in)?;

        let min_mid = min_out_after_slippage(opportunity.amount_mid, slippage)?;
        let amount_mid = self
            .evaluator
            .buy_venue()
            .swap(ledger, bot, token_in, token_out, amount_in, min_mid)?;

        let min_out = min_out_after_slippage(opportunity.amount_out, slippage)?;
        let amount_out = self
            .evaluator
            .sell_venue()
            .swap(ledger, bot, token_out, token_in, amount_mid, min_out)?;

        let realised = signed_delta(amount_out, amount_in);
        if !self.config.arbitrage.accepts(realised, amount_in)? {
            return Err(AppError::InsufficientProfitMargin {
                profit: realised,
                required,
            });
        }

        ledger.transfer(token_in, bot, caller, amount_in)?;
        Ok((amount_mid, amount_out))
    }
}
