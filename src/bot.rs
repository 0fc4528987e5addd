//! The sniping bot: owner, allow-list, evaluator, sinks and metrics.
//!
//! Custody is not stored here. Every state-changing call takes the
//! [`Ledger`] explicitly and runs to completion before returning.
//! Execution lives in [`crate::executor`], withdrawals in [`crate::treasury`].

use crate::arbitrage::ArbitrageEvaluator;
use crate::config::BotConfig;
use crate::errors::{AppError, Result};
use crate::events::EventSink;
use crate::ledger::Ledger;
use crate::metrics::{BotMetrics, GasMeter, GasOp};
use crate::models::{Receipt, TradeRecord};
use crate::whitelist::TokenWhitelist;
use alloy_primitives::{Address, I256, U256};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug)]
pub struct SnipingBot {
    pub(crate) address: Address,
    pub(crate) owner: Address,
    pub(crate) config: BotConfig,
    pub(crate) whitelist: TokenWhitelist,
    pub(crate) evaluator: ArbitrageEvaluator,
    pub(crate) sinks: Vec<Arc<dyn EventSink>>,
    pub(crate) metrics: BotMetrics,
}

impl SnipingBot {
    /// `address` is the bot's custody account in the ledger.
    pub fn new(
        address: Address,
        owner: Address,
        evaluator: ArbitrageEvaluator,
        config: BotConfig,
    ) -> Self {
        info!(
            %address,
            %owner,
            buy_venue = evaluator.buy_venue().name(),
            sell_venue = evaluator.sell_venue().name(),
            min_profit = %config.arbitrage.min_profit,
            min_profit_bps = config.arbitrage.min_profit_bps,
            slippage_bps = config.arbitrage.slippage_bps,
            "[INIT] sniping bot created"
        );
        Self {
            address,
            owner,
            config,
            whitelist: TokenWhitelist::new(),
            evaluator,
            sinks: Vec::new(),
            metrics: BotMetrics::new(),
        }
    }

    pub fn with_whitelist(mut self, whitelist: TokenWhitelist) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn metrics(&self) -> &BotMetrics {
        &self.metrics
    }

    pub fn whitelist(&self) -> &TokenWhitelist {
        &self.whitelist
    }

    /// Owner-only allow-list update. The receipt says whether the flag changed.
    pub fn set_whitelisted(
        &mut self,
        caller: Address,
        token: Address,
        enabled: bool,
    ) -> Result<Receipt<bool>> {
        let mut meter = GasMeter::start();
        let result = self
            .ensure_owner(caller)
            .and_then(|()| self.whitelist.set_whitelisted(token, enabled));

        match result {
            Ok(changed) => {
                meter.charge(if changed {
                    GasOp::StorageWrite
                } else {
                    GasOp::StorageNoop
                });
                self.metrics.record_call(meter.used());
                info!(%token, enabled, changed, "[WHITELIST] token updated");
                Ok(Receipt::new(changed, meter.used()))
            }
            Err(e) => {
                self.metrics.record_rejection(&e, meter.used());
                warn!(%caller, %token, error = %e, "[WHITELIST] update rejected");
                Err(e)
            }
        }
    }

    pub fn is_whitelisted(&self, token: Address) -> bool {
        self.whitelist.is_whitelisted(token)
    }

    /// Read-only profit estimate for a whitelisted pair.
    pub fn check_price_arbitrage(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<I256> {
        self.ensure_tradable(token_in, token_out)?;
        self.evaluator
            .estimate_profit(ledger, token_in, token_out, amount_in)
    }

    /// Native currency currently in custody.
    pub fn native_balance(&self, ledger: &Ledger) -> U256 {
        ledger.native_balance_of(self.address)
    }

    /// Token balance currently in custody.
    pub fn token_balance(&self, ledger: &Ledger, token: Address) -> U256 {
        ledger.balance_of(token, self.address)
    }

    /// Where withdrawals are sent.
    pub fn withdraw_recipient(&self) -> Address {
        self.config.withdraw_recipient.unwrap_or(self.owner)
    }

    pub(crate) fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(AppError::Unauthorized(caller));
        }
        Ok(())
    }

    pub(crate) fn ensure_tradable(&self, token_in: Address, token_out: Address) -> Result<()> {
        for token in [token_in, token_out] {
            if token.is_zero() {
                return Err(AppError::InvalidToken);
            }
            if !self.whitelist.is_whitelisted(token) {
                return Err(AppError::TokenNotWhitelisted(token));
            }
        }
        Ok(())
    }

    /// Deliver a settled trade to every sink. Sink errors are logged only.
    pub(crate) fn emit(&self, record: &TradeRecord) {
        for sink in &self.sinks {
            if let Err(e) = sink.trade_executed(record) {
                error!(?sink, error = %e, "[SNIPE] failed to record TradeExecuted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::AppError;
    use crate::testing::{OTHER, OWNER, TOKEN_A, TOKEN_B, ether, fixture};
    use crate::whitelist::TokenWhitelist;
    use alloy_primitives::Address;

    #[test]
    fn owner_whitelists_tokens() {
        let mut f = fixture();
        f.bot.set_whitelisted(OWNER, TOKEN_A, true).unwrap();
        f.bot.set_whitelisted(OWNER, TOKEN_B, true).unwrap();
        assert!(f.bot.is_whitelisted(TOKEN_A));
        assert!(f.bot.is_whitelisted(TOKEN_B));

        let receipt = f.bot.set_whitelisted(OWNER, TOKEN_A, false).unwrap();
        assert!(receipt.value);
        assert!(receipt.gas_used > 0);
        assert!(!f.bot.is_whitelisted(TOKEN_A));
    }

    #[test]
    fn repeated_whitelist_write_reports_unchanged() {
        let mut f = fixture();
        let first = f.bot.set_whitelisted(OWNER, TOKEN_A, true).unwrap();
        let second = f.bot.set_whitelisted(OWNER, TOKEN_A, true).unwrap();
        assert!(first.value);
        assert!(!second.value);
        assert!(second.gas_used < first.gas_used);
    }

    #[test]
    fn zero_address_cannot_be_whitelisted() {
        let mut f = fixture();
        let err = f.bot.set_whitelisted(OWNER, Address::ZERO, true).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
        assert_eq!(err.to_string(), "Invalid token address");
    }

    #[test]
    fn only_owner_may_whitelist() {
        let mut f = fixture();
        let err = f.bot.set_whitelisted(OTHER, TOKEN_A, true).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(caller) if caller == OTHER));
        assert!(!f.bot.is_whitelisted(TOKEN_A));
        assert_eq!(f.bot.metrics().rejections["unauthorized"], 1);
    }

    #[test]
    fn seeded_whitelist_allows_trading_without_owner_calls() {
        let f = fixture();
        let seeded = TokenWhitelist::from_tokens([TOKEN_B, TOKEN_A]).unwrap();
        let bot = f.bot.with_whitelist(seeded);

        assert_eq!(bot.owner(), OWNER);
        assert_eq!(bot.whitelist().len(), 2);
        assert_eq!(bot.whitelist().whitelisted_tokens(), vec![TOKEN_A, TOKEN_B]);
        assert!(bot.is_whitelisted(TOKEN_A));
        assert!(
            bot.check_price_arbitrage(&f.ledger, TOKEN_A, TOKEN_B, ether(1))
                .unwrap()
                .is_positive()
        );
        assert_eq!(bot.metrics().calls, 0);
    }

    #[test]
    fn price_check_is_positive_for_one_token() {
        let mut f = fixture();
        f.whitelist_both();
        let profit = f
            .bot
            .check_price_arbitrage(&f.ledger, TOKEN_A, TOKEN_B, ether(1))
            .unwrap();
        assert!(profit.is_positive());
    }

    #[test]
    fn price_check_requires_whitelisted_tokens() {
        let f = fixture();
        assert!(matches!(
            f.bot.check_price_arbitrage(&f.ledger, TOKEN_A, TOKEN_B, ether(1)),
            Err(AppError::TokenNotWhitelisted(token)) if token == TOKEN_A
        ));
        assert!(matches!(
            f.bot.check_price_arbitrage(&f.ledger, Address::ZERO, TOKEN_B, ether(1)),
            Err(AppError::InvalidToken)
        ));
    }
}
