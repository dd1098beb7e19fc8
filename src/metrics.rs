//! Portfolio-level analytics derived from one state document.
//!
//! `aggregate` is a pure, total function: every edge case (zero symbols,
//! missing peaks, flat books) degrades to an identity value instead of a
//! division error. Money sums stay in `Decimal`; ratio statistics
//! (returns, dispersion, drawdown) are computed in `f64`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::StateDocument;

/// Floor for the peak-value denominator in the drawdown ratio.
const PEAK_EPSILON: f64 = 1e-6;

/// The nine portfolio aggregates served alongside the raw document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    /// Sum of per-symbol portfolio values (balance + position value).
    pub total_value: Decimal,
    /// Percentage return of the whole book against its combined initial
    /// capital. Zero when there are no symbols.
    pub total_return: f64,
    pub total_fees: Decimal,
    /// Sum of actual trade-history lengths. The legacy `num_trades`
    /// counter is never consulted, keeping this consistent with the
    /// history view.
    pub total_trades: usize,
    /// Mean per-symbol return.
    pub avg_return: f64,
    /// Population standard deviation of per-symbol returns.
    pub std_dev: f64,
    /// Dispersion-adjusted return: avg / stddev, zero for a flat or
    /// single-symbol book.
    pub sharpe: f64,
    /// Percentage decline of current total value from the summed peaks.
    pub drawdown: f64,
    pub symbol_count: usize,
}

/// Compute portfolio aggregates from a state document.
pub fn aggregate(doc: &StateDocument) -> PortfolioMetrics {
    let n = doc.traders.len();
    let initial = doc.initial_balance.to_f64().unwrap_or(0.0);

    let mut total_value = Decimal::ZERO;
    let mut total_fees = Decimal::ZERO;
    let mut total_trades = 0usize;
    let mut returns: Vec<f64> = Vec::with_capacity(n);
    let mut total_peak = 0.0f64;

    for trader in doc.traders.values() {
        let pv = trader.portfolio_value();
        let pv_f = pv.to_f64().unwrap_or(0.0);

        total_value += pv;
        total_fees += trader.total_fees;
        total_trades += trader.trade_history.len();

        if initial > 0.0 {
            returns.push((pv_f / initial - 1.0) * 100.0);
        } else {
            returns.push(0.0);
        }

        // A symbol with no recorded peak is assumed to be at its peak now,
        // yielding zero drawdown rather than a spurious one.
        let peak = trader
            .highest_value
            .and_then(|h| h.to_f64())
            .unwrap_or(pv_f);
        total_peak += peak;
    }

    let total_value_f = total_value.to_f64().unwrap_or(0.0);

    // 0/0 policy for an empty book: no symbols means no change.
    let total_initial = initial * n as f64;
    let total_return = if total_initial > 0.0 {
        (total_value_f / total_initial - 1.0) * 100.0
    } else {
        0.0
    };

    let avg_return = if n > 0 {
        returns.iter().sum::<f64>() / n as f64
    } else {
        0.0
    };

    let std_dev = if n > 1 {
        let variance = returns
            .iter()
            .map(|r| (r - avg_return).powi(2))
            .sum::<f64>()
            / n as f64;
        variance.sqrt()
    } else {
        0.0
    };

    let sharpe = if std_dev > 0.0 {
        avg_return / std_dev
    } else {
        0.0
    };

    let drawdown = if n > 0 {
        (total_value_f / total_peak.max(PEAK_EPSILON) - 1.0) * 100.0
    } else {
        0.0
    };

    PortfolioMetrics {
        total_value,
        total_return,
        total_fees,
        total_trades,
        avg_return,
        std_dev,
        sharpe,
        drawdown,
        symbol_count: n,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
