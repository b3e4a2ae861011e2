//! Signal strategies.
//!
//! The strategy family is closed: each strategy is a variant of
//! [`SignalStrategy`] and all of them expose the same `generate` operation.

use tracing::info;

use super::error::{DataError, MacrossError};
use super::moving_average::trailing_means;
use super::price::{check_timeline, PriceBar};
use super::signal::{Signal, SignalPoint};

pub const MOVING_AVERAGE_CROSSOVER: &str = "moving_average_crossover";

/// Window lengths for the moving-average crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyParameters {
    pub short_window: usize,
    pub long_window: usize,
}

impl StrategyParameters {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, MacrossError> {
        let params = StrategyParameters {
            short_window,
            long_window,
        };
        params.validate()?;
        Ok(params)
    }

    /// `0 < short_window < long_window`.
    pub fn validate(&self) -> Result<(), MacrossError> {
        if self.short_window == 0 {
            return Err(MacrossError::invalid(
                "strategy",
                "short_window",
                "short_window must be positive",
            ));
        }
        if self.short_window >= self.long_window {
            return Err(MacrossError::invalid(
                "strategy",
                "short_window",
                format!(
                    "short_window ({}) must be smaller than long_window ({})",
                    self.short_window, self.long_window
                ),
            ));
        }
        Ok(())
    }
}

impl Default for StrategyParameters {
    fn default() -> Self {
        StrategyParameters {
            short_window: 10,
            long_window: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalStrategy {
    MovingAverageCrossover(StrategyParameters),
}

impl SignalStrategy {
    /// Looks a strategy up by its configuration name.
    pub fn from_name(name: &str, params: StrategyParameters) -> Result<Self, MacrossError> {
        match name.trim() {
            MOVING_AVERAGE_CROSSOVER => {
                params.validate()?;
                Ok(SignalStrategy::MovingAverageCrossover(params))
            }
            other => Err(MacrossError::invalid(
                "strategy",
                "name",
                format!("unknown strategy '{}'", other),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SignalStrategy::MovingAverageCrossover(_) => MOVING_AVERAGE_CROSSOVER,
        }
    }

    pub fn generate(&self, prices: &[PriceBar]) -> Result<Vec<SignalPoint>, MacrossError> {
        match self {
            SignalStrategy::MovingAverageCrossover(params) => generate(prices, *params),
        }
    }
}

/// Moving-average crossover signals, one per bar.
///
/// The indicator is 1 while the short mean is strictly above the long mean;
/// the signal is the change in indicator from the previous bar.
pub fn generate(
    prices: &[PriceBar],
    params: StrategyParameters,
) -> Result<Vec<SignalPoint>, MacrossError> {
    params.validate()?;
    check_timeline(prices, |b| b.timestamp)?;
    if prices.iter().all(|b| b.valid_close().is_none()) {
        return Err(DataError::NoPrices.into());
    }

    let closes: Vec<Option<f64>> = prices.iter().map(|b| b.close).collect();
    let short_ma = trailing_means(&closes, params.short_window);
    let long_ma = trailing_means(&closes, params.long_window);

    let mut signals = Vec::with_capacity(prices.len());
    let mut prev_indicator: Option<i8> = None;

    for (i, bar) in prices.iter().enumerate() {
        let indicator = match (short_ma[i], long_ma[i]) {
            (Some(short), Some(long)) if short > long => 1,
            _ => 0,
        };
        let signal = match prev_indicator {
            None => Signal::Undefined,
            Some(prev) => Signal::from_indicator_diff(indicator - prev),
        };
        prev_indicator = Some(indicator);

        signals.push(SignalPoint {
            timestamp: bar.timestamp,
            close: bar.close,
            signal,
        });
    }

    info!(
        short_window = params.short_window,
        long_window = params.long_window,
        bars = prices.len(),
        "generated moving average crossover signals"
    );
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar::new(start() + Duration::days(i as i64), close))
            .collect()
    }

    fn signals_of(points: &[SignalPoint]) -> Vec<Signal> {
        points.iter().map(|p| p.signal).collect()
    }

    #[test]
    fn params_reject_equal_windows() {
        let err = StrategyParameters::new(5, 5).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn params_reject_zero_short_window() {
        assert!(StrategyParameters::new(0, 5).is_err());
    }

    #[test]
    fn params_default() {
        let p = StrategyParameters::default();
        assert_eq!((p.short_window, p.long_window), (10, 50));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn crossover_hand_computed() {
        // short(2): 100, 102.5, 103.5, 106, 109
        // long(3):  100, 102.5, 102.33, 105.67, 106.67
        // indicator: 0, 0, 1, 1, 1
        let bars = make_bars(&[100.0, 105.0, 102.0, 110.0, 108.0]);
        let points = generate(&bars, StrategyParameters::new(2, 3).unwrap()).unwrap();

        assert_eq!(
            signals_of(&points),
            vec![
                Signal::Undefined,
                Signal::Hold,
                Signal::Buy,
                Signal::Hold,
                Signal::Hold
            ]
        );
        assert_eq!(points[2].close, Some(102.0));
    }

    #[test]
    fn crossover_down_emits_sell() {
        let bars = make_bars(&[10.0, 12.0, 14.0, 16.0, 8.0, 6.0, 4.0]);
        let points = generate(&bars, StrategyParameters::new(1, 3).unwrap()).unwrap();
        let signals = signals_of(&points);

        assert_eq!(signals[0], Signal::Undefined);
        assert_eq!(signals[1], Signal::Buy);
        assert_eq!(signals[4], Signal::Sell);
        assert_eq!(signals.iter().filter(|s| **s == Signal::Buy).count(), 1);
        assert_eq!(signals.iter().filter(|s| **s == Signal::Sell).count(), 1);
    }

    #[test]
    fn output_matches_input_order_and_length() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let points = generate(&bars, StrategyParameters::new(1, 2).unwrap()).unwrap();
        assert_eq!(points.len(), bars.len());
        for (p, b) in points.iter().zip(&bars) {
            assert_eq!(p.timestamp, b.timestamp);
        }
    }

    #[test]
    fn no_lookahead() {
        let prefix = [100.0, 101.0, 99.0, 104.0, 103.0, 107.0];
        let mut extended = prefix.to_vec();
        extended.extend([50.0, 200.0, 10.0]);

        let params = StrategyParameters::new(2, 4).unwrap();
        let short = generate(&make_bars(&prefix), params).unwrap();
        let long = generate(&make_bars(&extended), params).unwrap();

        assert_eq!(signals_of(&short), signals_of(&long[..prefix.len()]));
    }

    #[test]
    fn invalid_windows_fail_before_data_checks() {
        let err = generate(&[], StrategyParameters {
            short_window: 5,
            long_window: 3,
        })
        .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn empty_series_is_data_error() {
        let err = generate(&[], StrategyParameters::new(1, 2).unwrap()).unwrap_err();
        assert!(matches!(err, MacrossError::Data(DataError::EmptySeries)));
    }

    #[test]
    fn all_missing_is_data_error() {
        let bars = vec![PriceBar::missing(start()), PriceBar::missing(start() + Duration::days(1))];
        let err = generate(&bars, StrategyParameters::new(1, 2).unwrap()).unwrap_err();
        assert!(matches!(err, MacrossError::Data(DataError::NoPrices)));
    }

    #[test]
    fn non_monotonic_is_data_error() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0]);
        bars.swap(1, 2);
        let err = generate(&bars, StrategyParameters::new(1, 2).unwrap()).unwrap_err();
        assert!(matches!(err, MacrossError::Data(DataError::NonMonotonic { index: 2 })));
    }

    #[test]
    fn from_name_known_and_unknown() {
        let params = StrategyParameters::new(2, 3).unwrap();
        let s = SignalStrategy::from_name("moving_average_crossover", params).unwrap();
        assert_eq!(s.name(), MOVING_AVERAGE_CROSSOVER);

        let err = SignalStrategy::from_name("rsi", params).unwrap_err();
        assert!(matches!(err, MacrossError::ConfigInvalid { ref key, .. } if key == "name"));
    }

    #[test]
    fn strategy_generate_delegates() {
        let params = StrategyParameters::new(2, 3).unwrap();
        let bars = make_bars(&[100.0, 105.0, 102.0, 110.0, 108.0]);
        let via_enum = SignalStrategy::MovingAverageCrossover(params)
            .generate(&bars)
            .unwrap();
        assert_eq!(via_enum, generate(&bars, params).unwrap());
    }

    #[test]
    fn flat_prices_never_cross() {
        for price in [0.1, 100.07, 123.45, 999.99] {
            let bars = make_bars(&vec![price; 200]);
            for (short, long) in [(2, 3), (3, 7), (5, 20), (10, 50)] {
                let points = generate(&bars, StrategyParameters::new(short, long).unwrap()).unwrap();
                let crossings = points
                    .iter()
                    .filter(|p| matches!(p.signal, Signal::Buy | Signal::Sell))
                    .count();
                assert_eq!(crossings, 0, "price {price} windows {short}/{long}");
            }
        }
    }
}
