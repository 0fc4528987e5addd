use alloy_primitives::{Address, I256, U256};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid token address")]
    InvalidToken,

    #[error("Token not whitelisted: {0}")]
    TokenNotWhitelisted(Address),

    #[error("Insufficient allowance: approved {approved}, required {required}")]
    InsufficientAllowance { approved: U256, required: U256 },

    #[error("Insufficient profit margin: profit {profit}, required {required}")]
    InsufficientProfitMargin { profit: I256, required: U256 },

    #[error("Unauthorized caller: {0}")]
    Unauthorized(Address),

    #[error("Insufficient balance: held {held}, requested {requested}")]
    InsufficientBalance { held: U256, requested: U256 },

    #[error("Nothing to withdraw")]
    NothingToWithdraw,

    #[error("External swap failure: {0}")]
    ExternalSwapFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Math error: {0}")]
    Math(String),
}

impl AppError {
    /// Short machine-friendly label, used as a metrics key.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidToken => "invalid_token",
            AppError::TokenNotWhitelisted(_) => "token_not_whitelisted",
            AppError::InsufficientAllowance { .. } => "insufficient_allowance",
            AppError::InsufficientProfitMargin { .. } => "insufficient_profit_margin",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::NothingToWithdraw => "nothing_to_withdraw",
            AppError::ExternalSwapFailure(_) => "external_swap_failure",
            AppError::Config(_) | AppError::Env(_) | AppError::ParseInt(_) => "config",
            AppError::Io(_) | AppError::SerdeJson(_) | AppError::Toml(_) => "io",
            AppError::Math(_) => "math",
        }
    }
}
