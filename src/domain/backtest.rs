//! Backtest parameters and the signal → simulation → summary pipeline.

use chrono::NaiveDate;

use super::error::MacrossError;
use super::metrics::{PerformanceReport, TRADING_DAYS_PER_YEAR};
use super::portfolio::{self, PortfolioState};
use super::price::PriceBar;
use super::signal::SignalPoint;
use super::strategy::{SignalStrategy, StrategyParameters};
use super::trade::{trades, Trade};
use crate::ports::data_port::Granularity;

/// The only knobs that affect a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestParameters {
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: f64,
    pub periods_per_year: u32,
}

impl BacktestParameters {
    pub fn strategy_parameters(&self) -> StrategyParameters {
        StrategyParameters {
            short_window: self.short_window,
            long_window: self.long_window,
        }
    }
}

impl Default for BacktestParameters {
    fn default() -> Self {
        let strategy = StrategyParameters::default();
        BacktestParameters {
            short_window: strategy.short_window,
            long_window: strategy.long_window,
            initial_capital: 10_000.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Where the price history comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub instrument: String,
    pub granularity: Granularity,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parameters: BacktestParameters,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub signals: Vec<SignalPoint>,
    pub states: Vec<PortfolioState>,
    pub trades: Vec<Trade>,
    pub report: PerformanceReport,
}

pub fn run_backtest(
    prices: &[PriceBar],
    strategy: &SignalStrategy,
    params: &BacktestParameters,
) -> Result<BacktestResult, MacrossError> {
    let signals = strategy.generate(prices)?;
    let states = portfolio::run(&signals, params.initial_capital)?;
    let report =
        PerformanceReport::summarize(&states, params.initial_capital, params.periods_per_year)?;
    let trades = trades(&states);

    Ok(BacktestResult {
        signals,
        states,
        trades,
        report,
    })
}
