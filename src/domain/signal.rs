//! Per-timestep trading signals.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    /// No prior indicator to compare against (first timestep only).
    Undefined,
}

impl Signal {
    /// Maps an indicator difference to a signal: +1 Buy, -1 Sell, 0 Hold.
    pub fn from_indicator_diff(diff: i8) -> Self {
        match diff {
            1 => Signal::Buy,
            -1 => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
            Signal::Undefined => write!(f, "UNDEFINED"),
        }
    }
}

/// A signal paired with the close price of the bar it was computed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub timestamp: NaiveDateTime,
    pub close: Option<f64>,
    pub signal: Signal,
}
