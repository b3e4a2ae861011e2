//! Market data access port.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::MacrossError;
use crate::domain::price::PriceBar;

/// Bar spacing requested from a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    SixHours,
    OneDay,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::OneMinute => "1m",
            Granularity::FiveMinutes => "5m",
            Granularity::FifteenMinutes => "15m",
            Granularity::OneHour => "1h",
            Granularity::SixHours => "6h",
            Granularity::OneDay => "1d",
        }
    }

    /// Bars per year, used as the default Sharpe annualization factor for
    /// intraday data on a 24/7 market. Daily bars use trading days.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Granularity::OneMinute => 525_600,
            Granularity::FiveMinutes => 105_120,
            Granularity::FifteenMinutes => 35_040,
            Granularity::OneHour => 8_760,
            Granularity::SixHours => 1_460,
            Granularity::OneDay => crate::domain::metrics::TRADING_DAYS_PER_YEAR,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(Granularity::OneMinute),
            "5m" => Ok(Granularity::FiveMinutes),
            "15m" => Ok(Granularity::FifteenMinutes),
            "1h" => Ok(Granularity::OneHour),
            "6h" => Ok(Granularity::SixHours),
            "1d" => Ok(Granularity::OneDay),
            other => Err(format!(
                "unknown granularity '{}' (expected 1m, 5m, 15m, 1h, 6h or 1d)",
                other
            )),
        }
    }
}

pub trait MarketDataSource {
    /// Bars for `instrument` between `start` and `end` inclusive, ordered by
    /// timestamp. An empty result means no data is available.
    fn fetch(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> Result<Vec<PriceBar>, MacrossError>;
}
