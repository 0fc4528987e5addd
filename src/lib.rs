//! Core library for the sniping-bot project.
//!
//! A [`SnipingBot`] keeps a token allow-list, prices two-leg round trips
//! across a buy and a sell venue, executes them atomically against a
//! [`Ledger`] when the profit clears the configured floor, and lets its
//! owner withdraw what it holds.

pub mod arbitrage;
pub mod bot;
pub mod config;
pub mod dex;
pub mod errors;
pub mod events;
pub mod executor;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod scanner;
pub mod treasury;
pub mod utils;
pub mod whitelist;

#[cfg(test)]
pub(crate) mod testing;

pub use bot::SnipingBot;
pub use errors::{AppError, Result};
pub use ledger::Ledger;
