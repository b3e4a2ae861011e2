//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MacrossError;

/// Port for writing the per-step results of a backtest.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), MacrossError>;
}
