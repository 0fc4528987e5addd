use anyhow::{Context, Result};
use sniping_bot::{
    SnipingBot,
    arbitrage::ArbitrageEvaluator,
    config::{BotConfig, ScenarioConfig},
    events::{TracingSink, TradeJournal},
    scanner::{Session, spawn_snipe_loop},
    utils::{self, format_units},
    whitelist::TokenWhitelist,
};
use std::sync::Arc;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = BotConfig::from_env()?;
    let scenario_path =
        std::env::var("SNIPER_CONFIG").unwrap_or_else(|_| "config/sniper.toml".into());
    let scenario = ScenarioConfig::load(&scenario_path)
        .with_context(|| format!("loading scenario {scenario_path}"))?;
    let decimals = config.token_decimals;

    tracing::info!(
        scenario = %scenario_path,
        buy_venue = %scenario.buy_venue,
        sell_venue = %scenario.sell_venue,
        pairs = scenario.pairs.len(),
        "[INIT] sniping-bot starting"
    );

    let mut ledger = scenario.seed_ledger(decimals)?;
    let (buy, sell) = scenario.build_venues()?;
    let owner = scenario.owner;

    let journal = match &config.journal_path {
        Some(path) => TradeJournal::with_file(path)?,
        None => TradeJournal::in_memory(),
    };
    let journal = Arc::new(journal);

    let whitelist = TokenWhitelist::from_tokens(scenario.whitelist_tokens()?)?;
    let bot = SnipingBot::new(
        scenario.bot,
        owner,
        ArbitrageEvaluator::new(buy, sell),
        config.clone(),
    )
    .with_whitelist(whitelist)
    .with_sink(Arc::new(TracingSink::new(decimals)))
    .with_sink(journal.clone());
    tracing::info!(
        tokens = ?bot.whitelist().whitelisted_tokens(),
        "[WHITELIST] seeded from scenario"
    );

    for (token, allowance) in scenario.approvals(decimals)? {
        ledger.approve(token, owner, bot.address(), allowance)?;
    }
    let pairs = scenario.resolved_pairs(decimals)?;

    let session = Arc::new(Mutex::new(Session::new(bot, ledger)));
    let summary = spawn_snipe_loop(session.clone(), owner, pairs.clone(), scenario.scan.clone())
        .await
        .context("scan loop panicked")?;

    let mut guard = session.lock().await;
    let Session { bot, ledger } = &mut *guard;
    tracing::info!(?summary, trades = journal.len(), "[SCAN] done");
    for line in bot.metrics().report().lines() {
        tracing::info!("[METRICS] {line}");
    }

    let mut tokens: Vec<_> = pairs.iter().map(|p| p.token_in).collect();
    tokens.sort();
    tokens.dedup();
    for token in tokens {
        let profit = bot
            .metrics()
            .realized_profit
            .get(&token)
            .copied()
            .unwrap_or_default();
        if profit.is_zero() {
            continue;
        }
        let receipt = bot.withdraw_token(ledger, owner, token, profit)?;
        tracing::info!(
            %token,
            amount = %format_units(receipt.value, decimals),
            recipient = %bot.withdraw_recipient(),
            "[TREASURY] profit withdrawn"
        );
    }

    if !bot.native_balance(ledger).is_zero() {
        let receipt = bot.withdraw_native(ledger, owner)?;
        tracing::info!(
            amount = %format_units(receipt.value, decimals),
            "[TREASURY] native balance withdrawn"
        );
    }

    Ok(())
}
