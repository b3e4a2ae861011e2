//! Configuration validation.
//!
//! Validates every config field before a backtest runs.

use chrono::NaiveDate;

use crate::domain::backtest::BacktestParameters;
use crate::domain::error::MacrossError;
use crate::domain::strategy::{SignalStrategy, StrategyParameters};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::Granularity;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    validate_pair(config)?;
    parse_granularity(config)?;
    validate_dates(config)?;
    parse_initial_capital(config)?;
    parse_periods_per_year(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    let params = parse_strategy_parameters(config)?;
    let name = strategy_name(config);
    SignalStrategy::from_name(&name, params)?;
    Ok(())
}

fn validate_pair(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    match config.get_string("trading", "pair") {
        Some(_) => Ok(()),
        None => Err(MacrossError::missing("trading", "pair")),
    }
}

pub fn parse_granularity(config: &dyn ConfigPort) -> Result<Granularity, MacrossError> {
    match config.get_string("trading", "granularity") {
        None => Ok(Granularity::OneDay),
        Some(raw) => raw
            .parse()
            .map_err(|reason: String| MacrossError::invalid("trading", "granularity", reason)),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    let (start_date, end_date) = parse_dates(config)?;
    if start_date >= end_date {
        return Err(MacrossError::invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), MacrossError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;
    Ok((start, end))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, MacrossError> {
    match value {
        None => Err(MacrossError::missing("backtest", field)),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            MacrossError::invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

/// Configured starting capital, or the default when the key is absent.
pub fn parse_initial_capital(config: &dyn ConfigPort) -> Result<f64, MacrossError> {
    if !config.has_key("backtest", "initial_capital") {
        return Ok(BacktestParameters::default().initial_capital);
    }
    // unparseable values come back as NaN
    let value = config.get_double("backtest", "initial_capital", f64::NAN);
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MacrossError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be a positive number",
        ))
    }
}

/// Explicit `periods_per_year`, or `None` to derive it from the granularity.
pub fn parse_periods_per_year(config: &dyn ConfigPort) -> Result<Option<u32>, MacrossError> {
    match config.get_string("backtest", "periods_per_year") {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .map(Some)
            .ok_or_else(|| {
                MacrossError::invalid(
                    "backtest",
                    "periods_per_year",
                    "periods_per_year must be a positive integer",
                )
            }),
    }
}

pub fn strategy_name(config: &dyn ConfigPort) -> String {
    config
        .get_string("strategy", "name")
        .unwrap_or_else(|| crate::domain::strategy::MOVING_AVERAGE_CROSSOVER.to_string())
}

pub fn parse_strategy_parameters(
    config: &dyn ConfigPort,
) -> Result<StrategyParameters, MacrossError> {
    let defaults = StrategyParameters::default();
    let params = StrategyParameters {
        short_window: parse_window(config, "short_window", defaults.short_window)?,
        long_window: parse_window(config, "long_window", defaults.long_window)?,
    };
    params.validate()?;
    Ok(params)
}

fn parse_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, MacrossError> {
    match config.get_string("strategy", key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                MacrossError::invalid("strategy", key, format!("{} must be a positive integer", key))
            }),
    }
}
