//! Performance summary of a simulated run.

use std::fmt;

use super::error::MacrossError;
use super::portfolio::PortfolioState;

pub const TRADING_DAYS_PER_YEAR: u32 = 252;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub initial_capital: f64,
    pub final_portfolio_value: f64,
    pub total_return_pct: f64,
    pub annualized_sharpe: f64,
    pub max_drawdown_pct: f64,
}

impl PerformanceReport {
    pub fn summarize(
        states: &[PortfolioState],
        initial_capital: f64,
        periods_per_year: u32,
    ) -> Result<Self, MacrossError> {
        let last = states.last().ok_or_else(|| MacrossError::Precondition {
            reason: "cannot summarize before a simulation has produced states".into(),
        })?;

        let final_portfolio_value = last.portfolio_value;
        let total_return_pct = if initial_capital != 0.0 {
            (final_portfolio_value / initial_capital - 1.0) * 100.0
        } else {
            0.0
        };

        // the first period return has no predecessor and carries no information
        let returns: Vec<f64> = states.iter().skip(1).map(|s| s.period_return).collect();
        let annualized_sharpe = sharpe_ratio(&returns, periods_per_year);

        let values: Vec<f64> = states.iter().map(|s| s.portfolio_value).collect();
        let max_drawdown_pct = max_drawdown(&values) * 100.0;

        Ok(PerformanceReport {
            initial_capital,
            final_portfolio_value,
            total_return_pct,
            annualized_sharpe,
            max_drawdown_pct,
        })
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final Portfolio Value:   ${:.2}", self.final_portfolio_value)?;
        writeln!(f, "Total Return (%):        {:.2}%", self.total_return_pct)?;
        writeln!(f, "Annualized Sharpe Ratio: {:.2}", self.annualized_sharpe)?;
        write!(f, "Max Drawdown (%):        {:.2}%", self.max_drawdown_pct)
    }
}

/// Zero risk-free rate, sample standard deviation. Degenerate inputs give 0.
fn sharpe_ratio(returns: &[f64], periods_per_year: u32) -> f64 {
    if returns.len() < 2 || returns.iter().all(|&r| r == returns[0]) {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 && stddev.is_finite() {
        (periods_per_year as f64).sqrt() * mean / stddev
    } else {
        0.0
    }
}

/// Most negative `value / running_peak - 1`, as a fraction (≤ 0).
fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = value / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
