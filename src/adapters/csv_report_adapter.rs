//! CSV writer for per-step backtest results.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MacrossError;
use crate::ports::report_port::ReportPort;

const HEADER: [&str; 8] = [
    "timestamp",
    "close",
    "signal",
    "cash",
    "position_quantity",
    "asset_value",
    "portfolio_value",
    "period_return",
];

#[derive(Debug, Default)]
pub struct CsvReportWriter;

fn write_error(e: csv::Error) -> MacrossError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => MacrossError::Io(io),
        other => MacrossError::Io(std::io::Error::other(format!("{:?}", other))),
    }
}

impl ReportPort for CsvReportWriter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), MacrossError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(write_error)?;
        wtr.write_record(HEADER).map_err(write_error)?;

        for state in &result.states {
            wtr.write_record([
                state.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                state.close.map(|c| c.to_string()).unwrap_or_default(),
                state.signal.to_string(),
                state.cash.to_string(),
                state.position_quantity.to_string(),
                state.asset_value.to_string(),
                state.portfolio_value.to_string(),
                state.period_return.to_string(),
            ])
            .map_err(write_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
