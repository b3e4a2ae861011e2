//! Core domain types and logic.

pub mod price;
pub mod signal;
pub mod moving_average;
pub mod strategy;
pub mod portfolio;
pub mod trade;
pub mod metrics;
pub mod backtest;
pub mod config_validation;
pub mod error;
