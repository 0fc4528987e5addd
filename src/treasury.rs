//! Owner-only withdrawal of custody.

use crate::bot::SnipingBot;
use crate::errors::{AppError, Result};
use crate::ledger::Ledger;
use crate::metrics::{GasMeter, GasOp};
use crate::models::Receipt;
use alloy_primitives::{Address, U256};
use tracing::{info, warn};

impl SnipingBot {
    /// Send the whole native balance to the withdraw recipient.
    pub fn withdraw_native(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
    ) -> Result<Receipt<U256>> {
        let mut meter = GasMeter::start();
        let result = self.withdraw_native_inner(ledger, &mut meter, caller);
        self.finish_withdrawal(meter, caller, Address::ZERO, result)
    }

    /// Send `amount` of `token` from custody to the withdraw recipient.
    pub fn withdraw_token(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        token: Address,
        amount: U256,
    ) -> Result<Receipt<U256>> {
        let mut meter = GasMeter::start();
        let result = self.withdraw_token_inner(ledger, &mut meter, caller, token, amount);
        self.finish_withdrawal(meter, caller, token, result)
    }

    fn withdraw_native_inner(
        &self,
        ledger: &mut Ledger,
        meter: &mut GasMeter,
        caller: Address,
    ) -> Result<U256> {
        self.ensure_owner(caller)?;
        let recipient = self.checked_recipient()?;
        meter.charge(GasOp::StorageRead);
        let balance = ledger.native_balance_of(self.address);
        if balance.is_zero() {
            return Err(AppError::NothingToWithdraw);
        }
        meter.charge(GasOp::NativeTransfer);
        ledger.send_native(self.address, recipient, balance)?;
        Ok(balance)
    }

    fn withdraw_token_inner(
        &self,
        ledger: &mut Ledger,
        meter: &mut GasMeter,
        caller: Address,
        token: Address,
        amount: U256,
    ) -> Result<U256> {
        self.ensure_owner(caller)?;
        let recipient = self.checked_recipient()?;
        if token.is_zero() {
            return Err(AppError::InvalidToken);
        }
        if amount.is_zero() {
            return Err(AppError::NothingToWithdraw);
        }
        meter.charge(GasOp::StorageRead);
        let held = ledger.balance_of(token, self.address);
        if held < amount {
            return Err(AppError::InsufficientBalance {
                held,
                requested: amount,
            });
        }
        meter.charge(GasOp::TokenTransfer);
        ledger.transfer(token, self.address, recipient, amount)?;
        Ok(amount)
    }

    /// Withdraw recipient, refusing the zero address and the bot itself.
    fn checked_recipient(&self) -> Result<Address> {
        let recipient = self.withdraw_recipient();
        if recipient.is_zero() || recipient == self.address {
            return Err(AppError::Config(format!(
                "withdraw recipient {recipient} must be a non-zero address other than the bot"
            )));
        }
        Ok(recipient)
    }

    fn finish_withdrawal(
        &mut self,
        meter: GasMeter,
        caller: Address,
        token: Address,
        result: Result<U256>,
    ) -> Result<Receipt<U256>> {
        match result {
            Ok(amount) => {
                self.metrics.record_withdrawal(meter.used());
                info!(
                    %token,
                    %amount,
                    recipient = %self.withdraw_recipient(),
                    gas_used = meter.used(),
                    "[TREASURY] withdrawal sent"
                );
                Ok(Receipt::new(amount, meter.used()))
            }
            Err(e) => {
                self.metrics.record_rejection(&e, meter.used());
                warn!(%caller, %token, error = %e, "[TREASURY] withdrawal rejected");
                Err(e)
            }
        }
    }
}
