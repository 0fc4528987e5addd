//! Configuration loader and application settings.
//!
//! Scalar bot settings come from the environment (`.env` is loaded by the
//! binary); the trading world the binary runs against comes from a TOML
//! scenario file.

use crate::arbitrage::ArbitrageConfig;
use crate::dex::{ConstantProductVenue, FixedRateVenue, LiquiditySource};
use crate::errors::{AppError, Result};
use crate::ledger::Ledger;
use crate::utils::parse_units;
use alloy_primitives::{Address, U256};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings the bot core needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub arbitrage: ArbitrageConfig,
    /// Decimals used to parse and display amounts.
    pub token_decimals: u8,
    /// Withdrawals go here; `None` means the owner.
    pub withdraw_recipient: Option<Address>,
    /// JSONL file mirroring the trade journal.
    pub journal_path: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            arbitrage: ArbitrageConfig {
                // 0.001 of an 18-decimal token
                min_profit: U256::from(1_000_000_000_000_000u64),
                min_profit_bps: 10,
                slippage_bps: 50,
            },
            token_decimals: 18,
            withdraw_recipient: None,
            journal_path: None,
        }
    }
}

impl BotConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// `MIN_PROFIT` (decimal), `MIN_PROFIT_BPS`, `SLIPPAGE_BPS`,
    /// `TOKEN_DECIMALS`, `WITHDRAW_RECIPIENT`, `JOURNAL_PATH`.
    pub fn from_env() -> Result<Self> {
        let token_decimals: u8 = env_or("TOKEN_DECIMALS", "18").parse()?;
        let min_profit = parse_units(&env_or("MIN_PROFIT", "0.001"), token_decimals)?;
        let min_profit_bps: u32 = env_or("MIN_PROFIT_BPS", "10").parse()?;
        let slippage_bps: u32 = env_or("SLIPPAGE_BPS", "50").parse()?;
        if slippage_bps > 10_000 {
            return Err(AppError::Config(format!(
                "SLIPPAGE_BPS must be at most 10000, got {slippage_bps}"
            )));
        }

        let withdraw_recipient = match std::env::var("WITHDRAW_RECIPIENT") {
            Ok(raw) => parse_recipient(&raw)?,
            Err(_) => None,
        };
        let journal_path = std::env::var("JOURNAL_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            arbitrage: ArbitrageConfig {
                min_profit,
                min_profit_bps,
                slippage_bps,
            },
            token_decimals,
            withdraw_recipient,
            journal_path,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Blank means "the owner". The zero address is refused.
fn parse_recipient(raw: &str) -> Result<Option<Address>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let recipient = parse_address("WITHDRAW_RECIPIENT", raw)?;
    if recipient.is_zero() {
        return Err(AppError::Config(
            "WITHDRAW_RECIPIENT must not be the zero address".into(),
        ));
    }
    Ok(Some(recipient))
}

fn parse_address(field: &str, raw: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{field}: invalid address {raw:?}: {e}")))
}

/// The trading world the binary runs against.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    pub owner: Address,
    pub bot: Address,
    /// Native currency sent to the bot at start-up (decimal).
    #[serde(default)]
    pub native_deposit: Option<String>,
    /// Symbols whitelisted at start-up.
    #[serde(default)]
    pub whitelist: Vec<String>,
    pub buy_venue: String,
    pub sell_venue: String,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(rename = "token")]
    pub tokens: Vec<TokenConfig>,
    #[serde(rename = "venue")]
    pub venues: Vec<VenueConfig>,
    #[serde(rename = "pair", default)]
    pub pairs: Vec<PairConfig>,
    /// holder name ("owner", "bot") -> symbol -> decimal amount
    #[serde(default)]
    pub balances: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Number of ticks before the loop stops; 0 runs forever.
    #[serde(default = "default_rounds")]
    pub rounds: u64,
    #[serde(default = "default_heartbeat_every")]
    pub heartbeat_every: u64,
}

fn default_interval_ms() -> u64 {
    1_000
}

fn default_rounds() -> u64 {
    5
}

fn default_heartbeat_every() -> u64 {
    5
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            rounds: default_rounds(),
            heartbeat_every: default_heartbeat_every(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    ConstantProduct,
    FixedRate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    pub name: String,
    pub address: Address,
    pub kind: VenueKind,
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,
    #[serde(rename = "rate", default)]
    pub rates: Vec<RateConfig>,
    /// symbol -> decimal amount minted to the venue
    #[serde(default)]
    pub liquidity: BTreeMap<String, String>,
}

fn default_fee_bps() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    pub token_in: String,
    pub token_out: String,
    pub rate_bps: u32,
}

/// A direction the scanner evaluates every tick.
#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
    pub token_in: String,
    pub token_out: String,
    /// Decimal trade size in `token_in`.
    pub amount: String,
    /// How much the owner approves the bot for, defaults to unlimited.
    #[serde(default)]
    pub allowance: Option<String>,
}

/// A scan pair resolved to addresses and base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPair {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub allowance: U256,
}

impl ScenarioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(content)?;
        scenario.venue(&scenario.buy_venue)?;
        scenario.venue(&scenario.sell_venue)?;
        Ok(scenario)
    }

    pub fn token(&self, symbol: &str) -> Result<Address> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .map(|t| t.address)
            .ok_or_else(|| AppError::Config(format!("unknown token symbol {symbol:?}")))
    }

    pub fn venue(&self, name: &str) -> Result<&VenueConfig> {
        self.venues
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| AppError::Config(format!("unknown venue {name:?}")))
    }

    fn holder(&self, name: &str) -> Result<Address> {
        match name {
            "owner" => Ok(self.owner),
            "bot" => Ok(self.bot),
            other => parse_address("balances", other),
        }
    }

    /// Build the buy and sell venues. A venue named twice is shared.
    pub fn build_venues(&self) -> Result<(Arc<dyn LiquiditySource>, Arc<dyn LiquiditySource>)> {
        let buy = self.venue(&self.buy_venue)?.build(self)?;
        let sell = if self.sell_venue == self.buy_venue {
            Arc::clone(&buy)
        } else {
            self.venue(&self.sell_venue)?.build(self)?
        };
        Ok((buy, sell))
    }

    pub fn whitelist_tokens(&self) -> Result<Vec<Address>> {
        self.whitelist.iter().map(|s| self.token(s)).collect()
    }

    pub fn resolved_pairs(&self, decimals: u8) -> Result<Vec<ResolvedPair>> {
        self.pairs
            .iter()
            .map(|p| {
                let allowance = match &p.allowance {
                    Some(raw) => parse_units(raw, decimals)?,
                    None => U256::MAX,
                };
                Ok(ResolvedPair {
                    token_in: self.token(&p.token_in)?,
                    token_out: self.token(&p.token_out)?,
                    amount_in: parse_units(&p.amount, decimals)?,
                    allowance,
                })
            })
            .collect()
    }

    /// Allowance the owner grants the bot per input token, summed over every
    /// pair that spends it. Saturates at `U256::MAX` (unlimited).
    pub fn approvals(&self, decimals: u8) -> Result<BTreeMap<Address, U256>> {
        let mut approvals: BTreeMap<Address, U256> = BTreeMap::new();
        for pair in self.resolved_pairs(decimals)? {
            let total = approvals.entry(pair.token_in).or_default();
            *total = total.saturating_add(pair.allowance);
        }
        Ok(approvals)
    }

    /// Fresh ledger with venue liquidity, holder balances and the native deposit.
    pub fn seed_ledger(&self, decimals: u8) -> Result<Ledger> {
        let mut ledger = Ledger::new();
        for venue in &self.venues {
            for (symbol, amount) in &venue.liquidity {
                ledger.mint(self.token(symbol)?, venue.address, parse_units(amount, decimals)?)?;
            }
        }
        for (holder, holdings) in &self.balances {
            let account = self.holder(holder)?;
            for (symbol, amount) in holdings {
                ledger.mint(self.token(symbol)?, account, parse_units(amount, decimals)?)?;
            }
        }
        if let Some(raw) = &self.native_deposit {
            ledger.deposit_native(self.bot, parse_units(raw, decimals)?)?;
        }
        Ok(ledger)
    }
}

impl VenueConfig {
    pub fn build(&self, scenario: &ScenarioConfig) -> Result<Arc<dyn LiquiditySource>> {
        let venue: Arc<dyn LiquiditySource> = match self.kind {
            VenueKind::ConstantProduct => Arc::new(ConstantProductVenue::new(
                self.name.clone(),
                self.address,
                self.fee_bps,
            )),
            VenueKind::FixedRate => {
                let mut venue = FixedRateVenue::new(self.name.clone(), self.address);
                for rate in &self.rates {
                    venue = venue.with_rate(
                        scenario.token(&rate.token_in)?,
                        scenario.token(&rate.token_out)?,
                        rate.rate_bps,
                    );
                }
                Arc::new(venue)
            }
        };
        Ok(venue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
owner = "0x0000000000000000000000000000000000000001"
bot = "0x00000000000000000000000000000000000000b0"
native_deposit = "1"
whitelist = ["TSTA", "TSTB"]
buy_venue = "router-a"
sell_venue = "router-b"

[scan]
interval_ms = 10
rounds = 2

[[token]]
symbol = "TSTA"
address = "0x00000000000000000000000000000000000000a1"

[[token]]
symbol = "TSTB"
address = "0x00000000000000000000000000000000000000b2"

[[venue]]
name = "router-a"
address = "0x0000000000000000000000000000000000000f01"
kind = "fixed_rate"
liquidity = { TSTA = "10000", TSTB = "10000" }

[[venue.rate]]
token_in = "TSTA"
token_out = "TSTB"
rate_bps = 10200

[[venue]]
name = "router-b"
address = "0x0000000000000000000000000000000000000f02"
kind = "constant_product"
fee_bps = 25
liquidity = { TSTA = "500", TSTB = "400" }

[[pair]]
token_in = "TSTA"
token_out = "TSTB"
amount = "1"

[balances.owner]
TSTA = "10000"
"#;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u8))
    }

    #[test]
    fn default_thresholds() {
        let config = BotConfig::default();
        assert_eq!(config.arbitrage.min_profit, ether(1) / U256::from(1_000u64));
        assert_eq!(config.arbitrage.slippage_bps, 50);
        assert!(config.withdraw_recipient.is_none());
    }

    #[test]
    fn parses_scenario_file() {
        let scenario = ScenarioConfig::parse(SCENARIO).unwrap();
        assert_eq!(scenario.tokens.len(), 2);
        assert_eq!(scenario.venues[0].kind, VenueKind::FixedRate);
        assert_eq!(scenario.venues[0].rates[0].rate_bps, 10_200);
        assert_eq!(scenario.venues[1].fee_bps, 25);
        assert_eq!(scenario.scan.rounds, 2);
        assert_eq!(scenario.scan.heartbeat_every, 5);
        assert_eq!(scenario.whitelist_tokens().unwrap().len(), 2);
    }

    #[test]
    fn seeds_ledger_from_scenario() {
        let scenario = ScenarioConfig::parse(SCENARIO).unwrap();
        let ledger = scenario.seed_ledger(18).unwrap();
        let tsta = scenario.token("tsta").unwrap();
        let tstb = scenario.token("TSTB").unwrap();
        let router_b = scenario.venue("router-b").unwrap().address;

        assert_eq!(ledger.balance_of(tsta, scenario.owner), ether(10_000));
        assert_eq!(ledger.balance_of(tstb, router_b), ether(400));
        assert_eq!(ledger.native_balance_of(scenario.bot), ether(1));
    }

    #[test]
    fn resolves_pairs_with_unlimited_default_allowance() {
        let scenario = ScenarioConfig::parse(SCENARIO).unwrap();
        let pairs = scenario.resolved_pairs(18).unwrap();
        assert_eq!(pairs[0].amount_in, ether(1));
        assert_eq!(pairs[0].allowance, U256::MAX);
    }

    /// Scenario with a second TSTA pair allowed 3 tokens, and `first` as the
    /// first pair's allowance.
    fn two_tsta_pairs(first: Option<&str>) -> ScenarioConfig {
        let mut extra = String::from("amount = \"1\"\n");
        if let Some(allowance) = first {
            extra.push_str(&format!("allowance = \"{allowance}\"\n"));
        }
        extra.push_str(
            "\n[[pair]]\ntoken_in = \"TSTA\"\ntoken_out = \"TSTB\"\n\
             amount = \"0.5\"\nallowance = \"3\"\n",
        );
        ScenarioConfig::parse(&SCENARIO.replace("amount = \"1\"\n", &extra)).unwrap()
    }

    #[test]
    fn approvals_add_up_across_pairs_sharing_a_token() {
        let scenario = two_tsta_pairs(Some("2"));
        let tsta = scenario.token("TSTA").unwrap();
        assert_eq!(scenario.pairs.len(), 2);
        assert_eq!(scenario.approvals(18).unwrap()[&tsta], ether(5));

        let approvals = two_tsta_pairs(None).approvals(18).unwrap();
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals[&tsta], U256::MAX);
    }

    #[test]
    fn recipient_must_be_a_real_address() {
        assert_eq!(parse_recipient("  ").unwrap(), None);
        assert_eq!(
            parse_recipient("0x000000000000000000000000000000000000fa17").unwrap(),
            Some(alloy_primitives::address!("0x000000000000000000000000000000000000fa17"))
        );
        assert!(matches!(
            parse_recipient("0x0000000000000000000000000000000000000000"),
            Err(AppError::Config(_))
        ));
        assert!(matches!(parse_recipient("not-an-address"), Err(AppError::Config(_))));
    }

    #[test]
    fn builds_distinct_venues() {
        let scenario = ScenarioConfig::parse(SCENARIO).unwrap();
        let (buy, sell) = scenario.build_venues().unwrap();
        assert_eq!(buy.name(), "router-a");
        assert_eq!(sell.name(), "router-b");
    }

    #[test]
    fn unknown_references_are_config_errors() {
        let broken = SCENARIO.replace("sell_venue = \"router-b\"", "sell_venue = \"nope\"");
        assert!(matches!(
            ScenarioConfig::parse(&broken),
            Err(AppError::Config(_))
        ));

        let scenario = ScenarioConfig::parse(SCENARIO).unwrap();
        assert!(matches!(scenario.token("XYZ"), Err(AppError::Config(_))));
    }
}
