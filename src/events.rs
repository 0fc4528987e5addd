//! `TradeExecuted` sinks.
//!
//! Sinks only observe; a sink failure is logged by the bot and never undoes
//! a settled trade.

use crate::errors::Result;
use crate::models::TradeRecord;
use crate::utils::format_units;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

pub trait EventSink: fmt::Debug + Send + Sync {
    fn trade_executed(&self, record: &TradeRecord) -> Result<()>;
}

/// Emits one structured log line per trade.
#[derive(Debug, Clone)]
pub struct TracingSink {
    decimals: u8,
}

impl TracingSink {
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }
}

impl EventSink for TracingSink {
    fn trade_executed(&self, record: &TradeRecord) -> Result<()> {
        let profit = if record.profit.is_negative() {
            format!("-{}", format_units(record.profit.unsigned_abs(), self.decimals))
        } else {
            format_units(record.profit.unsigned_abs(), self.decimals).to_string()
        };
        info!(
            trader = %record.trader,
            token_in = %record.token_in,
            token_out = %record.token_out,
            amount_in = %format_units(record.amount_in, self.decimals),
            amount_out = %format_units(record.amount_out, self.decimals),
            profit,
            "[SNIPE] TradeExecuted"
        );
        Ok(())
    }
}

/// Append-only trade history, optionally mirrored to a JSONL file.
#[derive(Debug, Default)]
pub struct TradeJournal {
    records: Mutex<Vec<TradeRecord>>,
    path: Option<PathBuf>,
}

impl TradeJournal {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Journal that also appends each record as one JSON line to `path`.
    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            records: Mutex::new(Vec::new()),
            path: Some(path),
        })
    }

    pub fn records(&self) -> Vec<TradeRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append_line(path: &Path, record: &TradeRecord) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(record)?;
        writeln!(file, "{json}")?;
        Ok(())
    }
}

impl EventSink for TradeJournal {
    fn trade_executed(&self, record: &TradeRecord) -> Result<()> {
        if let Some(path) = &self.path {
            Self::append_line(path, record)?;
        }
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(())
    }
}
