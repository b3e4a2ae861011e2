//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvMarketData;
use crate::adapters::csv_report_adapter::CsvReportWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestParameters};
use crate::domain::config_validation::{
    parse_dates, parse_granularity, parse_initial_capital, parse_periods_per_year,
    parse_strategy_parameters, strategy_name, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::{DataError, MacrossError};
use crate::domain::strategy::SignalStrategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataSource;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "macross", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Write per-step results to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override [trading] pair
        #[arg(long)]
        pair: Option<String>,
        /// Override [backtest] data_dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            pair,
            data_dir,
        } => run_backtest(&config, output.as_deref(), pair.as_deref(), data_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `[logging] level`.
pub fn init_logging(config: &dyn ConfigPort) {
    let level = config
        .get_string("logging", "level")
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // a subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    pair_override: Option<&str>,
) -> Result<BacktestConfig, MacrossError> {
    let instrument = match pair_override {
        Some(p) => p.trim().to_uppercase(),
        None => adapter
            .get_string("trading", "pair")
            .ok_or_else(|| MacrossError::missing("trading", "pair"))?,
    };
    let granularity = parse_granularity(adapter)?;
    let (start_date, end_date) = parse_dates(adapter)?;
    let strategy = parse_strategy_parameters(adapter)?;

    Ok(BacktestConfig {
        instrument,
        granularity,
        start_date,
        end_date,
        parameters: BacktestParameters {
            short_window: strategy.short_window,
            long_window: strategy.long_window,
            initial_capital: parse_initial_capital(adapter)?,
            periods_per_year: parse_periods_per_year(adapter)?
                .unwrap_or_else(|| granularity.periods_per_year()),
        },
    })
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<SignalStrategy, MacrossError> {
    let params = parse_strategy_parameters(adapter)?;
    SignalStrategy::from_name(&strategy_name(adapter), params)
}

pub fn resolve_data_dir(adapter: &dyn ConfigPort, data_dir_override: Option<&Path>) -> PathBuf {
    match data_dir_override {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from(
            adapter
                .get_string("backtest", "data_dir")
                .unwrap_or_else(|| "data".to_string()),
        ),
    }
}

fn validate_all(adapter: &dyn ConfigPort) -> Result<(), MacrossError> {
    validate_backtest_config(adapter)?;
    validate_strategy_config(adapter)?;
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    output_path: Option<&Path>,
    pair_override: Option<&str>,
    data_dir_override: Option<&Path>,
) -> ExitCode {
    // Stage 1: Load config and install logging
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    init_logging(&adapter);

    // Stage 2: Validate and build
    let built = validate_all(&adapter).and_then(|()| {
        Ok((
            build_backtest_config(&adapter, pair_override)?,
            build_strategy(&adapter)?,
        ))
    });
    let (bt_config, strategy) = match built {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvMarketData::new(resolve_data_dir(&adapter, data_dir_override));
    let report_port = output_path.map(|_| CsvReportWriter);

    run_backtest_pipeline(
        &data_port,
        report_port.as_ref().map(|r| r as &dyn ReportPort),
        &strategy,
        &bt_config,
        output_path,
    )
}

/// Fetch → signals → simulation → summary → optional CSV output.
pub fn run_backtest_pipeline(
    data_port: &dyn MarketDataSource,
    report_port: Option<&dyn ReportPort>,
    strategy: &SignalStrategy,
    bt_config: &BacktestConfig,
    output_path: Option<&Path>,
) -> ExitCode {
    // Stage 3: Fetch price history
    info!(
        instrument = %bt_config.instrument,
        start = %bt_config.start_date,
        end = %bt_config.end_date,
        granularity = %bt_config.granularity,
        "fetching price history"
    );
    let prices = match data_port.fetch(
        &bt_config.instrument,
        bt_config.start_date,
        bt_config.end_date,
        bt_config.granularity,
    ) {
        Ok(bars) => bars,
        Err(e) => {
            error!(error = %e, "failed to fetch price history");
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if prices.is_empty() {
        let err = MacrossError::from(DataError::EmptySeries);
        eprintln!(
            "error: no data for {} between {} and {}",
            bt_config.instrument, bt_config.start_date, bt_config.end_date
        );
        return (&err).into();
    }

    // Stage 4: Run the core
    eprintln!(
        "Running backtest: {} ({}), {} bars, strategy {}",
        bt_config.instrument,
        bt_config.granularity,
        prices.len(),
        strategy.name()
    );
    let result = match backtest_engine::run_backtest(&prices, strategy, &bt_config.parameters) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "backtest failed");
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Console summary to stderr
    eprintln!("\n=== Trades ===");
    if result.trades.is_empty() {
        eprintln!("  (none)");
    }
    for trade in &result.trades {
        eprintln!(
            "  {} {:<4} @ {:.2}  qty {:.6}  cash {:.2}",
            trade.timestamp, trade.side, trade.price, trade.quantity, trade.cash_after
        );
    }
    eprintln!("\n=== Performance ===");
    eprintln!("Initial Capital:         ${:.2}", result.report.initial_capital);
    eprintln!("{}", result.report);

    // Stage 6: Optional per-step output
    if let (Some(port), Some(path)) = (report_port, output_path) {
        if let Err(e) = port.write(&result, path) {
            eprintln!("error: failed to write results: {e}");
            return (&e).into();
        }
        eprintln!("\nResults written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let built = validate_all(&adapter).and_then(|()| {
        Ok((
            build_backtest_config(&adapter, None)?,
            build_strategy(&adapter)?,
        ))
    });
    match built {
        Ok((bt_config, strategy)) => {
            let p = &bt_config.parameters;
            eprintln!("  pair:             {}", bt_config.instrument);
            eprintln!("  granularity:      {}", bt_config.granularity);
            eprintln!("  range:            {} to {}", bt_config.start_date, bt_config.end_date);
            eprintln!("  strategy:         {}", strategy.name());
            eprintln!("  windows:          {} / {}", p.short_window, p.long_window);
            eprintln!("  initial capital:  {:.2}", p.initial_capital);
            eprintln!("  periods per year: {}", p.periods_per_year);
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
