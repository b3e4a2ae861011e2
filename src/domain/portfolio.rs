//! Portfolio simulation over a signal series.
//!
//! The simulation is a fold: a small [`Holdings`] accumulator is threaded
//! through the signals in timestamp order and one [`PortfolioState`] is
//! emitted per step. Sizing is all-in on Buy and all-out on Sell.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::error::MacrossError;
use super::price::{check_timeline, valid_price};
use super::signal::{Signal, SignalPoint};

/// Portfolio snapshot recorded after the transition at `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub timestamp: NaiveDateTime,
    pub close: Option<f64>,
    pub signal: Signal,
    pub cash: f64,
    pub position_quantity: f64,
    pub asset_value: f64,
    pub portfolio_value: f64,
    pub period_return: f64,
}

impl PortfolioState {
    pub fn is_long(&self) -> bool {
        self.position_quantity > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Holdings {
    cash: f64,
    position_quantity: f64,
    last_portfolio_value: f64,
}

impl Holdings {
    fn new(initial_capital: f64) -> Self {
        Holdings {
            cash: initial_capital,
            position_quantity: 0.0,
            last_portfolio_value: initial_capital,
        }
    }

    /// Applies one signal and returns the updated holdings.
    fn transition(self, signal: Signal, close: Option<f64>) -> Holdings {
        let Some(price) = tradable_price(close) else {
            return self;
        };

        match signal {
            Signal::Buy if self.cash > 0.0 => Holdings {
                position_quantity: self.cash / price,
                cash: 0.0,
                ..self
            },
            Signal::Sell if self.position_quantity > 0.0 => Holdings {
                cash: self.position_quantity * price,
                position_quantity: 0.0,
                ..self
            },
            _ => self,
        }
    }
}

/// A close the simulator can trade and mark at: finite and strictly positive.
fn tradable_price(close: Option<f64>) -> Option<f64> {
    valid_price(close).filter(|&p| p > 0.0)
}

/// Runs the simulation, emitting exactly one state per input signal.
pub fn run(
    signals: &[SignalPoint],
    initial_capital: f64,
) -> Result<Vec<PortfolioState>, MacrossError> {
    if !initial_capital.is_finite() || initial_capital < 0.0 {
        return Err(MacrossError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be a non-negative number",
        ));
    }
    check_timeline(signals, |s| s.timestamp)?;

    let mut holdings = Holdings::new(initial_capital);
    let mut states = Vec::with_capacity(signals.len());

    for point in signals {
        let before = holdings;
        holdings = before.transition(point.signal, point.close);
        log_fill(point, &before, &holdings);

        let price = tradable_price(point.close);
        if price.is_none() && holdings.position_quantity > 0.0 {
            warn!(timestamp = %point.timestamp, "no usable close while long; asset value counted as 0");
        }

        let asset_value = price.map_or(0.0, |p| holdings.position_quantity * p);
        let portfolio_value = holdings.cash + asset_value;
        let period_return = if holdings.last_portfolio_value != 0.0 {
            portfolio_value / holdings.last_portfolio_value - 1.0
        } else {
            0.0
        };
        holdings.last_portfolio_value = portfolio_value;

        states.push(PortfolioState {
            timestamp: point.timestamp,
            close: point.close,
            signal: point.signal,
            cash: holdings.cash,
            position_quantity: holdings.position_quantity,
            asset_value,
            portfolio_value,
            period_return,
        });
    }

    info!(
        steps = states.len(),
        final_value = holdings.last_portfolio_value,
        "simulation finished"
    );
    Ok(states)
}

fn log_fill(point: &SignalPoint, before: &Holdings, after: &Holdings) {
    if before.position_quantity == 0.0 && after.position_quantity > 0.0 {
        debug!(
            timestamp = %point.timestamp,
            price = point.close.unwrap_or(f64::NAN),
            quantity = after.position_quantity,
            "buy"
        );
    } else if before.position_quantity > 0.0 && after.position_quantity == 0.0 {
        debug!(
            timestamp = %point.timestamp,
            price = point.close.unwrap_or(f64::NAN),
            cash = after.cash,
            "sell"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn ts(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(i as i64)
    }

    fn points(steps: &[(Signal, Option<f64>)]) -> Vec<SignalPoint> {
        steps
            .iter()
            .enumerate()
            .map(|(i, &(signal, close))| SignalPoint {
                timestamp: ts(i),
                close,
                signal,
            })
            .collect()
    }

    #[test]
    fn holdings_buy_uses_all_cash() {
        let h = Holdings::new(1000.0).transition(Signal::Buy, Some(100.0));
        assert_eq!(h.cash, 0.0);
        assert!((h.position_quantity - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn holdings_buy_requires_positive_price() {
        let h = Holdings::new(1000.0);
        assert_eq!(h.transition(Signal::Buy, Some(0.0)), h);
        assert_eq!(h.transition(Signal::Buy, Some(-5.0)), h);
        assert_eq!(h.transition(Signal::Buy, None), h);
    }

    #[test]
    fn holdings_sell_requires_positive_price() {
        let long = Holdings::new(1000.0).transition(Signal::Buy, Some(100.0));
        assert_eq!(long.transition(Signal::Sell, Some(-3.0)), long);
        assert_eq!(long.transition(Signal::Sell, Some(0.0)), long);
    }

    #[test]
    fn non_positive_close_never_drives_cash_negative() {
        let signals = points(&[
            (Signal::Buy, Some(100.0)),
            (Signal::Sell, Some(-3.0)),
            (Signal::Sell, Some(90.0)),
        ]);
        let states = run(&signals, 1000.0).unwrap();

        assert!(states.iter().all(|s| s.cash >= 0.0));
        assert!((states[1].position_quantity - 10.0).abs() < 1e-12);
        assert_eq!(states[1].asset_value, 0.0);
        assert!((states[2].cash - 900.0).abs() < 1e-9);
    }

    #[test]
    fn holdings_sell_when_flat_is_noop() {
        let h = Holdings::new(1000.0);
        assert_eq!(h.transition(Signal::Sell, Some(100.0)), h);
    }

    #[test]
    fn holdings_hold_and_undefined_carry_forward() {
        let h = Holdings::new(1000.0).transition(Signal::Buy, Some(50.0));
        assert_eq!(h.transition(Signal::Hold, Some(70.0)), h);
        assert_eq!(h.transition(Signal::Undefined, Some(70.0)), h);
    }

    #[test]
    fn round_trip() {
        let signals = points(&[
            (Signal::Undefined, Some(100.0)),
            (Signal::Buy, Some(100.0)),
            (Signal::Hold, Some(110.0)),
            (Signal::Sell, Some(120.0)),
        ]);
        let states = run(&signals, 1000.0).unwrap();

        assert_eq!(states.len(), 4);
        assert!((states[1].position_quantity - 10.0).abs() < 1e-12);
        assert_eq!(states[1].cash, 0.0);
        assert!((states[2].portfolio_value - 1100.0).abs() < 1e-9);
        assert!((states[3].cash - 1200.0).abs() < 1e-9);
        assert_eq!(states[3].position_quantity, 0.0);
    }

    #[test]
    fn second_buy_is_noop() {
        let signals = points(&[
            (Signal::Buy, Some(100.0)),
            (Signal::Buy, Some(50.0)),
        ]);
        let states = run(&signals, 1000.0).unwrap();

        assert!((states[0].position_quantity - 10.0).abs() < 1e-12);
        assert_eq!(states[1].position_quantity, states[0].position_quantity);
        assert_eq!(states[1].cash, 0.0);
        assert!((states[1].portfolio_value - 500.0).abs() < 1e-9);
    }

    #[test]
    fn period_returns() {
        let signals = points(&[
            (Signal::Undefined, Some(100.0)),
            (Signal::Buy, Some(100.0)),
            (Signal::Hold, Some(110.0)),
        ]);
        let states = run(&signals, 1000.0).unwrap();

        assert_eq!(states[0].period_return, 0.0);
        assert_eq!(states[1].period_return, 0.0);
        assert!((states[2].period_return - 0.10).abs() < 1e-12);
    }

    #[test]
    fn missing_price_keeps_position() {
        let signals = points(&[
            (Signal::Buy, Some(100.0)),
            (Signal::Sell, None),
            (Signal::Hold, Some(105.0)),
        ]);
        let states = run(&signals, 1000.0).unwrap();

        assert_eq!(states[1].asset_value, 0.0);
        assert_eq!(states[1].portfolio_value, 0.0);
        assert!((states[1].position_quantity - 10.0).abs() < 1e-12);
        assert_eq!(states[1].period_return, -1.0);
        // previous value is 0, so the recovery step reports a flat return
        assert_eq!(states[2].period_return, 0.0);
        assert!((states[2].portfolio_value - 1050.0).abs() < 1e-9);
    }

    #[test]
    fn empty_signals_rejected() {
        let err = run(&[], 1000.0).unwrap_err();
        assert!(matches!(err, MacrossError::Data(_)));
    }

    #[test]
    fn negative_capital_rejected() {
        let signals = points(&[(Signal::Undefined, Some(1.0))]);
        assert!(run(&signals, -1.0).unwrap_err().is_config());
        assert!(run(&signals, f64::NAN).unwrap_err().is_config());
    }

    #[test]
    fn is_long_reflects_position() {
        let signals = points(&[(Signal::Buy, Some(10.0)), (Signal::Sell, Some(11.0))]);
        let states = run(&signals, 100.0).unwrap();
        assert!(states[0].is_long());
        assert!(!states[1].is_long());
    }
}
