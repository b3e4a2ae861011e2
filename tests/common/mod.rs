#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use macross::domain::error::MacrossError;
pub use macross::domain::price::PriceBar;
use macross::domain::signal::{Signal, SignalPoint};
use macross::ports::data_port::{Granularity, MarketDataSource};
use std::collections::HashMap;

pub struct MockMarketData {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, instrument: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(instrument.to_string(), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl MarketDataSource for MockMarketData {
    fn fetch(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
        _granularity: Granularity,
    ) -> Result<Vec<PriceBar>, MacrossError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(MacrossError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(instrument)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.timestamp.date() >= start && b.timestamp.date() <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(i: usize) -> NaiveDateTime {
    date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap() + Duration::days(i as i64)
}

pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::new(day(i), close))
        .collect()
}

pub fn make_bars_with_gaps(closes: &[Option<f64>]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: day(i),
            close,
        })
        .collect()
}

pub fn make_signals(steps: &[(Signal, Option<f64>)]) -> Vec<SignalPoint> {
    steps
        .iter()
        .enumerate()
        .map(|(i, &(signal, close))| SignalPoint {
            timestamp: day(i),
            close,
            signal,
        })
        .collect()
}

/// Rising then falling series that produces one crossover each way for
/// short/long windows of 3/8.
pub fn generate_wave(count: usize, start_price: f64) -> Vec<PriceBar> {
    let half = count / 2;
    (0..count)
        .map(|i| {
            let offset = if i < half { i as f64 } else { (count - i) as f64 };
            PriceBar::new(day(i), start_price + offset)
        })
        .collect()
}
