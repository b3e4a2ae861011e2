//! Executed fills recovered from a simulated state sequence.

use chrono::NaiveDateTime;
use std::fmt;

use super::portfolio::PortfolioState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub timestamp: NaiveDateTime,
    pub side: Side,
    pub price: f64,
    pub quantity: f64,
    pub cash_after: f64,
}

/// Flat-to-long steps are buys, long-to-flat steps are sells.
pub fn trades(states: &[PortfolioState]) -> Vec<Trade> {
    let mut out = Vec::new();
    let mut prev_quantity = 0.0_f64;

    for state in states {
        let price = state.close.unwrap_or(f64::NAN);
        if prev_quantity == 0.0 && state.position_quantity > 0.0 {
            out.push(Trade {
                timestamp: state.timestamp,
                side: Side::Buy,
                price,
                quantity: state.position_quantity,
                cash_after: state.cash,
            });
        } else if prev_quantity > 0.0 && state.position_quantity == 0.0 {
            out.push(Trade {
                timestamp: state.timestamp,
                side: Side::Sell,
                price,
                quantity: prev_quantity,
                cash_after: state.cash,
            });
        }
        prev_quantity = state.position_quantity;
    }

    out
}
