//! Shared test world: an owner, a stranger, two tokens, two fixed-rate
//! routers and a bot, each holding 10_000 of both tokens.

use crate::arbitrage::ArbitrageEvaluator;
use crate::bot::SnipingBot;
use crate::config::BotConfig;
use crate::dex::{FixedRateVenue, LiquiditySource};
use crate::events::TradeJournal;
use crate::ledger::Ledger;
use alloy_primitives::{Address, U256, address};
use std::sync::Arc;

pub const OWNER: Address = address!("0x0000000000000000000000000000000000000001");
pub const OTHER: Address = address!("0x0000000000000000000000000000000000000002");
pub const BOT: Address = address!("0x00000000000000000000000000000000000000b0");
pub const TOKEN_A: Address = address!("0x00000000000000000000000000000000000000a1");
pub const TOKEN_B: Address = address!("0x00000000000000000000000000000000000000b2");
pub const BUY_ROUTER: Address = address!("0x0000000000000000000000000000000000000f01");
pub const SELL_ROUTER: Address = address!("0x0000000000000000000000000000000000000f02");

/// A -> B pays 2% over par on the buy router, B -> A 1% under par on the sell router.
pub const BUY_RATE_BPS: u32 = 10_200;
pub const SELL_RATE_BPS: u32 = 9_900;

pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u8))
}

pub struct Fixture {
    pub ledger: Ledger,
    pub bot: SnipingBot,
    pub journal: Arc<TradeJournal>,
}

impl Fixture {
    pub fn whitelist_both(&mut self) {
        self.bot.set_whitelisted(OWNER, TOKEN_A, true).unwrap();
        self.bot.set_whitelisted(OWNER, TOKEN_B, true).unwrap();
    }
}

pub fn fixture() -> Fixture {
    let buy =
        FixedRateVenue::new("buy-router", BUY_ROUTER).with_rate(TOKEN_A, TOKEN_B, BUY_RATE_BPS);
    let sell =
        FixedRateVenue::new("sell-router", SELL_ROUTER).with_rate(TOKEN_B, TOKEN_A, SELL_RATE_BPS);
    fixture_with(Arc::new(buy), Arc::new(sell), BotConfig::default())
}

pub fn fixture_with(
    buy: Arc<dyn LiquiditySource>,
    sell: Arc<dyn LiquiditySource>,
    config: BotConfig,
) -> Fixture {
    let mut ledger = Ledger::new();
    for holder in [OWNER, BOT, BUY_ROUTER, SELL_ROUTER] {
        ledger.mint(TOKEN_A, holder, ether(10_000)).unwrap();
        ledger.mint(TOKEN_B, holder, ether(10_000)).unwrap();
    }
    ledger.deposit_native(OWNER, ether(100)).unwrap();

    let journal = Arc::new(TradeJournal::in_memory());
    let bot = SnipingBot::new(BOT, OWNER, ArbitrageEvaluator::new(buy, sell), config)
        .with_sink(journal.clone());

    Fixture {
        ledger,
        bot,
        journal,
    }
}
