//! Price bar representation.

use chrono::NaiveDateTime;

use super::error::DataError;

/// One timestep of an instrument's price history.
///
/// `close` is `None` when the source had no usable price for this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub close: Option<f64>,
}

impl PriceBar {
    pub fn new(timestamp: NaiveDateTime, close: f64) -> Self {
        Self {
            timestamp,
            close: Some(close),
        }
    }

    pub fn missing(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            close: None,
        }
    }

    /// The close price if present and finite.
    pub fn valid_close(&self) -> Option<f64> {
        valid_price(self.close)
    }
}

pub(crate) fn valid_price(close: Option<f64>) -> Option<f64> {
    close.filter(|c| c.is_finite())
}

/// Rejects empty series and timestamps that fail to strictly increase.
pub(crate) fn check_timeline<T>(
    items: &[T],
    timestamp: impl Fn(&T) -> NaiveDateTime,
) -> Result<(), DataError> {
    if items.is_empty() {
        return Err(DataError::EmptySeries);
    }
    for (i, pair) in items.windows(2).enumerate() {
        if timestamp(&pair[1]) <= timestamp(&pair[0]) {
            return Err(DataError::NonMonotonic { index: i + 1 });
        }
    }
    Ok(())
}
