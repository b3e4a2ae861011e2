//! CSV file market data adapter.
//!
//! One file per instrument and granularity: `<base>/<instrument>_<granularity>.csv`
//! with a header row naming at least `timestamp` and `close`.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::domain::error::MacrossError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::{Granularity, MarketDataSource};

pub struct CsvMarketData {
    base_path: PathBuf,
}

impl CsvMarketData {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str, granularity: Granularity) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", instrument, granularity))
    }
}

fn source_error(reason: impl Into<String>) -> MacrossError {
    MacrossError::DataSource {
        reason: reason.into(),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl MarketDataSource for CsvMarketData {
    fn fetch(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> Result<Vec<PriceBar>, MacrossError> {
        let path = self.csv_path(instrument, granularity);
        let content = fs::read_to_string(&path)
            .map_err(|e| source_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| source_error(format!("CSV header error: {}", e)))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| source_error(format!("missing {} column", name)))
        };
        let ts_col = column("timestamp")?;
        let close_col = column("close")?;

        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| source_error(format!("CSV parse error: {}", e)))?;

            let raw_ts = record.get(ts_col).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                source_error(format!("invalid timestamp '{}' on row {}", raw_ts, line + 1))
            })?;

            let date = timestamp.date();
            if date < start || date > end {
                continue;
            }

            // a blank, garbled or non-positive close is a missing price, not a failure
            let raw_close = record.get(close_col).unwrap_or_default().trim();
            let close = raw_close.parse::<f64>().ok().filter(|&c| c > 0.0);
            if close.is_none() {
                warn!(instrument, row = line + 1, value = raw_close, "unusable close treated as missing");
            }

            bars.push(PriceBar { timestamp, close });
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(instrument, %granularity, bars = bars.len(), "loaded price history");
        Ok(bars)
    }
}
