//! Shared types for the VANTAGE dashboard backend.
//!
//! These mirror the JSON snapshot the trading bot writes: one
//! `StateDocument` per upload, holding a `TraderRecord` per symbol and an
//! append-ordered `trade_history` per trader. Older snapshots may omit
//! `highest_value` and `trade_history`, so those fields default.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// State document
// ---------------------------------------------------------------------------

/// One full snapshot of bot state — the unit of exchange between the bot
/// and the dashboard.
///
/// `traders` is a `BTreeMap` so iteration order is deterministic; the
/// trade-history assembler relies on that for its stable tiebreak.
/// Fields this schema doesn't know about are kept in `extra` and echoed
/// back on serialization, so the dashboard sees whatever the bot wrote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDocument {
    pub timestamp: DateTime<Utc>,
    pub session_start_time: DateTime<Utc>,
    pub initial_balance: Decimal,
    #[serde(default)]
    pub emergency_stopped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_reason: Option<String>,
    #[serde(default)]
    pub traders: BTreeMap<String, TraderRecord>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Per-symbol trader record
// ---------------------------------------------------------------------------

/// State of a single per-symbol trader within the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderRecord {
    pub balance: Decimal,
    /// Signed position size. |p| <= 0.1 is flat, > 0.1 long, < -0.1 short.
    #[serde(default)]
    pub position: Decimal,
    #[serde(default)]
    pub position_value: Decimal,
    #[serde(default)]
    pub entry_price: Decimal,
    #[serde(default)]
    pub current_price: Decimal,
    #[serde(default)]
    pub total_fees: Decimal,
    /// Legacy trade counter. May disagree with the actual history length
    /// and must never be trusted over it.
    #[serde(default)]
    pub num_trades: u64,
    /// Peak portfolio value ever observed for this symbol. Absent on older
    /// snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_value: Option<Decimal>,
    #[serde(default)]
    pub max_loss_reached: bool,
    /// Append-ordered trade log. Absent on older snapshots.
    #[serde(default)]
    pub trade_history: Vec<TradeRecord>,
}

impl TraderRecord {
    /// Current portfolio value: cash balance plus open position value.
    pub fn portfolio_value(&self) -> Decimal {
        self.balance + self.position_value
    }

    /// Classify the current position by the flat threshold.
    pub fn position_side(&self) -> PositionSide {
        let threshold = Decimal::new(1, 1); // 0.1
        if self.position > threshold {
            PositionSide::Long
        } else if self.position < -threshold {
            PositionSide::Short
        } else {
            PositionSide::Flat
        }
    }
}

/// Position direction after applying the flat threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Flat,
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Flat => write!(f, "FLAT"),
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Trade record
// ---------------------------------------------------------------------------

/// Immutable trade log entry.
///
/// `symbol` is not reliably present in the source trader log — the history
/// assembler stamps it from the owning trader's key, overriding whatever
/// value was stored. `action_type` is kept as the raw string so
/// unrecognized actions survive a round trip; use [`TradeRecord::action`]
/// to classify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub old_position: Decimal,
    #[serde(default)]
    pub new_position: Decimal,
    #[serde(default)]
    pub position_change: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub trade_value: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    #[serde(default)]
    pub slippage: Decimal,
    #[serde(default)]
    pub total_cost: Decimal,
    #[serde(default)]
    pub balance_before: Decimal,
    #[serde(default)]
    pub balance_after: Decimal,
    #[serde(default)]
    pub portfolio_value_before: Decimal,
    #[serde(default)]
    pub portfolio_value_after: Decimal,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub model_action: i64,
}

impl TradeRecord {
    /// Classify the raw `action_type` string.
    pub fn action(&self) -> ActionType {
        ActionType::parse(&self.action_type)
    }
}

/// Known trade action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Buy,
    Sell,
    Short,
    Cover,
    StopLoss,
    TakeProfit,
    Unknown,
}

impl ActionType {
    /// Parse the wire string; anything outside the vocabulary is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "BUY" => ActionType::Buy,
            "SELL" => ActionType::Sell,
            "SHORT" => ActionType::Short,
            "COVER" => ActionType::Cover,
            "STOP_LOSS" => ActionType::StopLoss,
            "TAKE_PROFIT" => ActionType::TakeProfit,
            _ => ActionType::Unknown,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Buy => "BUY",
            ActionType::Sell => "SELL",
            ActionType::Short => "SHORT",
            ActionType::Cover => "COVER",
            ActionType::StopLoss => "STOP_LOSS",
            ActionType::TakeProfit => "TAKE_PROFIT",
            ActionType::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

#[cfg(test)]
impl StateDocument {
    /// A minimal valid document with no traders.
    pub fn empty() -> Self {
        StateDocument {
            timestamp: Utc::now(),
            session_start_time: Utc::now(),
            initial_balance: rust_decimal_macros::dec!(10000),
            emergency_stopped: false,
            emergency_reason: None,
            traders: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
impl TraderRecord {
    /// A trader fixture with sensible defaults.
    pub fn sample(balance: Decimal, position_value: Decimal) -> Self {
        TraderRecord {
            balance,
            position: Decimal::ZERO,
            position_value,
            entry_price: Decimal::ZERO,
            current_price: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            num_trades: 0,
            highest_value: None,
            max_loss_reached: false,
            trade_history: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
