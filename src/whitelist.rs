//! Token allow-list gating which tokens the bot will trade.
//!
//! Absent tokens are not whitelisted. The zero address is never accepted.
//! Ownership checks happen in the bot; this type only stores the flags.

use crate::errors::{AppError, Result};
use alloy_primitives::Address;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct TokenWhitelist {
    enabled: HashSet<Address>,
}

impl TokenWhitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a seed list, e.g. the `whitelist` entry of the scenario file.
    pub fn from_tokens<I>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = Address>,
    {
        let mut whitelist = Self::new();
        for token in tokens {
            whitelist.set_whitelisted(token, true)?;
        }
        info!(tokens = whitelist.len(), "[WHITELIST] seeded");
        Ok(whitelist)
    }

    /// Set the flag for `token`. Returns whether the stored value changed.
    pub fn set_whitelisted(&mut self, token: Address, enabled: bool) -> Result<bool> {
        if token.is_zero() {
            return Err(AppError::InvalidToken);
        }
        let changed = if enabled {
            self.enabled.insert(token)
        } else {
            self.enabled.remove(&token)
        };
        debug!(%token, enabled, changed, "[WHITELIST] update");
        Ok(changed)
    }

    pub fn is_whitelisted(&self, token: Address) -> bool {
        self.enabled.contains(&token)
    }

    /// Enabled tokens in address order.
    pub fn whitelisted_tokens(&self) -> Vec<Address> {
        let mut tokens: Vec<Address> = self.enabled.iter().copied().collect();
        tokens.sort();
        tokens
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const TOKEN_A: Address = address!("0x00000000000000000000000000000000000000a1");
    const TOKEN_B: Address = address!("0x00000000000000000000000000000000000000b2");

    #[test]
    fn absent_tokens_are_not_whitelisted() {
        let whitelist = TokenWhitelist::new();
        assert!(!whitelist.is_whitelisted(TOKEN_A));
    }

    #[test]
    fn enable_then_disable() {
        let mut whitelist = TokenWhitelist::new();
        assert!(whitelist.set_whitelisted(TOKEN_A, true).unwrap());
        assert!(whitelist.is_whitelisted(TOKEN_A));

        assert!(whitelist.set_whitelisted(TOKEN_A, false).unwrap());
        assert!(!whitelist.is_whitelisted(TOKEN_A));
    }

    #[test]
    fn repeated_writes_are_no_ops() {
        let mut whitelist = TokenWhitelist::new();
        whitelist.set_whitelisted(TOKEN_A, true).unwrap();
        assert!(!whitelist.set_whitelisted(TOKEN_A, true).unwrap());
        assert!(!whitelist.set_whitelisted(TOKEN_B, false).unwrap());
        assert_eq!(whitelist.len(), 1);
    }

    #[test]
    fn zero_address_is_rejected() {
        let mut whitelist = TokenWhitelist::new();
        assert!(matches!(
            whitelist.set_whitelisted(Address::ZERO, true),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            TokenWhitelist::from_tokens([TOKEN_A, Address::ZERO]),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn lists_tokens_in_order() {
        let whitelist = TokenWhitelist::from_tokens([TOKEN_B, TOKEN_A]).unwrap();
        assert_eq!(whitelist.whitelisted_tokens(), vec![TOKEN_A, TOKEN_B]);
    }
}
