//! Miscellaneous helper utilities.

use crate::errors::{AppError, Result};
use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Seconds since the unix epoch, `0` if the clock is before it.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Parse a human decimal amount ("1.5") into base units with `decimals` places.
///
/// Rejects negative values and values with more fractional digits than the
/// token supports.
pub fn parse_units(raw: &str, decimals: u8) -> Result<U256> {
    let value = BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::Config(format!("invalid amount {raw:?}: {e}")))?;
    let scaled = value * BigDecimal::new(BigInt::from(1u8), -i64::from(decimals));
    let (int, _) = scaled.with_scale(0).into_bigint_and_exponent();

    if int.sign() == Sign::Minus {
        return Err(AppError::Config(format!("negative amount {raw:?}")));
    }
    if BigDecimal::new(int.clone(), 0) != scaled {
        return Err(AppError::Config(format!(
            "amount {raw:?} has more than {decimals} decimals"
        )));
    }

    U256::from_str_radix(&int.to_string(), 10)
        .map_err(|e| AppError::Config(format!("amount {raw:?} out of range: {e}")))
}

/// Render base units as a decimal number, for logs.
pub fn format_units(amount: U256, decimals: u8) -> BigDecimal {
    let int = BigInt::from_str(&amount.to_string()).unwrap_or_default();
    BigDecimal::new(int, i64::from(decimals)).normalized()
}
