//! Custody ledger: fungible token balances, allowances and native currency.
//!
//! Every value the bot, its owner and the venues hold lives here. Callers
//! route multi-step mutations through [`Ledger::transact`] so a failure at
//! any step restores the state the call started from.

use crate::errors::{AppError, Result};
use alloy_primitives::{Address, U256};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// (token, account) -> balance
    balances: HashMap<(Address, Address), U256>,
    /// (token, owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address, Address), U256>,
    native: HashMap<Address, U256>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` as one all-or-nothing unit.
    ///
    /// On `Err` the ledger is restored to its state before the call.
    pub fn transact<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(error = %e, "[LEDGER] rolling back transaction");
                *self = snapshot;
                Err(e)
            }
        }
    }

    /// Create `amount` of `token` out of thin air for `to`.
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<()> {
        if token.is_zero() {
            return Err(AppError::InvalidToken);
        }
        let balance = self.balances.entry((token, to)).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| AppError::Math("token supply overflow".into()))?;
        trace!(%token, %to, %amount, "[LEDGER] mint");
        Ok(())
    }

    pub fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    pub fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        if token.is_zero() {
            return Err(AppError::InvalidToken);
        }
        self.allowances.insert((token, owner, spender), amount);
        Ok(())
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let held = self.balance_of(token, from);
        if held < amount {
            return Err(AppError::InsufficientBalance {
                held,
                requested: amount,
            });
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or_else(|| AppError::Math("token balance overflow".into()))?;
        self.balances.insert((token, from), held - amount);
        self.balances.insert((token, to), credited);
        trace!(%token, %from, %to, %amount, "[LEDGER] transfer");
        Ok(())
    }

    /// Move `owner`'s tokens on behalf of `spender`, consuming allowance.
    ///
    /// An allowance of `U256::MAX` is treated as unlimited and never decreases.
    pub fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let approved = self.allowance(token, owner, spender);
        if approved < amount {
            return Err(AppError::InsufficientAllowance {
                approved,
                required: amount,
            });
        }
        self.transfer(token, owner, to, amount)?;
        if approved != U256::MAX {
            self.allowances
                .insert((token, owner, spender), approved - amount);
        }
        Ok(())
    }

    pub fn native_balance_of(&self, account: Address) -> U256 {
        self.native.get(&account).copied().unwrap_or_default()
    }

    /// Credit native currency from outside the ledger (genesis funding).
    pub fn deposit_native(&mut self, to: Address, amount: U256) -> Result<()> {
        let balance = self.native.entry(to).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| AppError::Math("native balance overflow".into()))?;
        Ok(())
    }

    pub fn send_native(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        let held = self.native_balance_of(from);
        if held < amount {
            return Err(AppError::InsufficientBalance {
                held,
                requested: amount,
            });
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let credited = self
            .native_balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| AppError::Math("native balance overflow".into()))?;
        self.native.insert(from, held - amount);
        self.native.insert(to, credited);
        trace!(%from, %to, %amount, "[LEDGER] native transfer");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const TOKEN: Address = address!("0x00000000000000000000000000000000000000a1");
    const ALICE: Address = address!("0x0000000000000000000000000000000000000001");
    const BOB: Address = address!("0x0000000000000000000000000000000000000002");

    fn funded() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.mint(TOKEN, ALICE, U256::from(100u64)).unwrap();
        ledger
    }

    #[test]
    fn transfer_moves_balance() {
        let mut ledger = funded();
        ledger.transfer(TOKEN, ALICE, BOB, U256::from(40u64)).unwrap();
        assert_eq!(ledger.balance_of(TOKEN, ALICE), U256::from(60u64));
        assert_eq!(ledger.balance_of(TOKEN, BOB), U256::from(40u64));
    }

    #[test]
    fn overdraft_is_rejected_without_change() {
        let mut ledger = funded();
        let before = ledger.clone();
        let err = ledger
            .transfer(TOKEN, ALICE, BOB, U256::from(101u64))
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut ledger = funded();
        ledger.approve(TOKEN, ALICE, BOB, U256::from(50u64)).unwrap();
        ledger
            .transfer_from(TOKEN, ALICE, BOB, BOB, U256::from(30u64))
            .unwrap();
        assert_eq!(ledger.allowance(TOKEN, ALICE, BOB), U256::from(20u64));

        let err = ledger
            .transfer_from(TOKEN, ALICE, BOB, BOB, U256::from(21u64))
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientAllowance { .. }));
    }

    #[test]
    fn unlimited_allowance_is_not_consumed() {
        let mut ledger = funded();
        ledger.approve(TOKEN, ALICE, BOB, U256::MAX).unwrap();
        ledger
            .transfer_from(TOKEN, ALICE, BOB, BOB, U256::from(30u64))
            .unwrap();
        assert_eq!(ledger.allowance(TOKEN, ALICE, BOB), U256::MAX);
    }

    #[test]
    fn transact_rolls_back_every_step_on_error() {
        let mut ledger = funded();
        ledger.deposit_native(ALICE, U256::from(5u64)).unwrap();
        let before = ledger.clone();

        let result: Result<()> = ledger.transact(|l| {
            l.transfer(TOKEN, ALICE, BOB, U256::from(10u64))?;
            l.send_native(ALICE, BOB, U256::from(5u64))?;
            l.transfer(TOKEN, BOB, ALICE, U256::from(11u64))
        });

        assert!(result.is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn zero_token_cannot_be_minted() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.mint(Address::ZERO, ALICE, U256::from(1u64)),
            Err(AppError::InvalidToken)
        ));
    }
}
