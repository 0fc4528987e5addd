//! Integer swap math. Everything here works on base units; no floats.

use crate::errors::{AppError, Result};
use alloy_primitives::{I256, U256};

/// Basis-point denominator (100% = 10_000 bps).
pub const BPS: u64 = 10_000;

/// Constant-product output for an exact input, Uniswap V2 style.
///
/// Formula: amount_out = (amount_in * (BPS - fee) * reserve_out)
///                       / (reserve_in * BPS + amount_in * (BPS - fee))
///
/// Returns zero for zero inputs so callers get a deterministic value for
/// dust amounts instead of an error.
pub fn get_amount_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> Result<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(U256::ZERO);
    }
    if u64::from(fee_bps) >= BPS {
        return Err(AppError::Math(format!("fee {fee_bps} bps leaves no output")));
    }

    let overflow = || AppError::Math("constant-product overflow".into());
    let amount_in_with_fee = amount_in
        .checked_mul(U256::from(BPS - u64::from(fee_bps)))
        .ok_or_else(overflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or_else(overflow)?;
    let denominator = reserve_in
        .checked_mul(U256::from(BPS))
        .and_then(|r| r.checked_add(amount_in_with_fee))
        .ok_or_else(overflow)?;

    Ok(numerator / denominator)
}

/// `amount * bps / BPS`, rounded down.
pub fn apply_bps(amount: U256, bps: u32) -> Result<U256> {
    amount
        .checked_mul(U256::from(bps))
        .map(|scaled| scaled / U256::from(BPS))
        .ok_or_else(|| AppError::Math(format!("{amount} * {bps} bps overflows")))
}

/// Minimum acceptable output once `slippage_bps` is tolerated.
pub fn min_out_after_slippage(expected: U256, slippage_bps: u32) -> Result<U256> {
    let kept = BPS.saturating_sub(u64::from(slippage_bps));
    // kept <= BPS, so this always fits in u32
    apply_bps(expected, kept as u32)
}

/// Signed `amount_out - amount_in`, saturating at the `I256` bounds.
pub fn signed_delta(amount_out: U256, amount_in: U256) -> I256 {
    if amount_out >= amount_in {
        I256::try_from(amount_out - amount_in).unwrap_or(I256::MAX)
    } else {
        -I256::try_from(amount_in - amount_out).unwrap_or(I256::MAX)
    }
}
