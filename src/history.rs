//! Trade history assembly.
//!
//! Flattens every trader's append-ordered log into one view: each record
//! is cloned with `symbol` stamped from the owning trader's key (the
//! stored value — often absent — is never trusted), then the combined
//! sequence is sorted newest-first and optionally filtered by symbol.
//! The input document is never mutated.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{StateDocument, TradeRecord};

/// The assembled, dashboard-ready trade history.
#[derive(Debug, Clone, Serialize)]
pub struct TradeHistoryView {
    pub trades: Vec<TradeRecord>,
    pub total_count: usize,
    /// The source document's timestamp, verbatim — not recomputed from
    /// trade data.
    pub last_updated: DateTime<Utc>,
}

/// Flatten, stamp, sort, and filter the per-symbol trade logs.
///
/// Sorting is stable descending by timestamp; ties keep their original
/// relative order (traders iterate alphabetically, entries in append
/// order). The filter applies after sorting, and `total_count` reflects
/// the filtered length.
pub fn assemble(doc: &StateDocument, filter_symbol: Option<&str>) -> TradeHistoryView {
    let mut trades: Vec<TradeRecord> = Vec::new();

    for (symbol, trader) in &doc.traders {
        for record in &trader.trade_history {
            let mut stamped = record.clone();
            stamped.symbol = symbol.clone();
            trades.push(stamped);
        }
    }

    trades.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    if let Some(symbol) = filter_symbol {
        trades.retain(|t| t.symbol == symbol);
    }

    TradeHistoryView {
        total_count: trades.len(),
        last_updated: doc.timestamp,
        trades,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
