//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_state_adapter::JsonStateAdapter;
use crate::adapters::universe_csv::{load_universe, universe_from_override};
use crate::domain::config_validation::validate_scan_config;
use crate::domain::error::SwingError;
use crate::domain::portfolio::Portfolio;
use crate::domain::scan::{run_scan, ScanConfig, ScanReport, DEFAULT_LOOKBACK_DAYS};
use crate::domain::signal::{Decision, ExitPolicy, DEFAULT_RSI_EXIT_LEVEL};
use crate::domain::universe::Universe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::state_port::{with_portfolio, StatePort};

const DEFAULT_REPORT_DIR: &str = "reports";

#[derive(Parser, Debug)]
#[command(name = "swingscan", about = "Daily swing-trading scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the universe, update positions and write the daily report
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Evaluation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<String>,
        /// Comma-separated symbols replacing the configured universe
        #[arg(long)]
        symbols: Option<String>,
        /// Evaluate and report without saving portfolio state
        #[arg(long)]
        dry_run: bool,
    },
    /// List open positions
    Positions {
        #[arg(short, long)]
        config: PathBuf,
        /// Include closed position history
        #[arg(long)]
        closed: bool,
    },
    /// Validate configuration, universe and state file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Options for one `scan` invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub as_of: Option<String>,
    pub symbols: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub report: ScanReport,
    pub report_path: PathBuf,
    pub portfolio: Portfolio,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Scan {
            config,
            as_of,
            symbols,
            dry_run,
        } => {
            let options = ScanOptions {
                as_of,
                symbols,
                dry_run,
            };
            run_scan_command(&config, &options)
        }
        Command::Positions { config, closed } => run_positions(&config, closed),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SwingError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Parse `--as-of`, falling back to today's local date.
pub fn parse_as_of(value: Option<&str>) -> Result<NaiveDate, SwingError> {
    match value {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SwingError::ConfigInvalid {
                section: "scan".into(),
                key: "as_of".into(),
                reason: format!("invalid date '{}' (expected YYYY-MM-DD)", s),
            }
        }),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn build_exit_policy(config: &dyn ConfigPort) -> ExitPolicy {
    let rsi_exit_level = config
        .get_bool("exit", "rsi_exit", false)
        .then(|| config.get_double("exit", "rsi_exit_level", DEFAULT_RSI_EXIT_LEVEL));
    ExitPolicy {
        rsi_exit_level,
        swing_high_exit: config.get_bool("exit", "swing_high_exit", false),
    }
}

pub fn build_scan_config(config: &dyn ConfigPort, as_of: NaiveDate) -> ScanConfig {
    ScanConfig {
        as_of,
        lookback_days: config.get_int("scan", "lookback_days", DEFAULT_LOOKBACK_DAYS),
        exit_policy: build_exit_policy(config),
    }
}

/// The `--symbols` override when given, else the configured universe file.
pub fn resolve_universe(
    config: &FileConfigAdapter,
    symbols: Option<&str>,
) -> Result<Universe, SwingError> {
    let suffix = config
        .get_string("scan", "symbol_suffix")
        .unwrap_or_default();
    let universe = match symbols {
        Some(list) => universe_from_override(list, &suffix)?,
        None => load_universe(&config.require_path("scan", "universe")?, &suffix)?,
    };
    Ok(universe)
}

fn state_store(config: &FileConfigAdapter) -> Result<JsonStateAdapter, SwingError> {
    Ok(JsonStateAdapter::new(
        config.require_path("portfolio", "state_file")?,
    ))
}

fn report_dir(config: &FileConfigAdapter) -> PathBuf {
    config.get_path_or("report", "output_dir", DEFAULT_REPORT_DIR)
}

/// Full scan pipeline against the configured adapters.
///
/// State is loaded before any symbol is evaluated and written back once after
/// the last one; a load failure aborts before anything is scanned.
pub fn execute_scan(
    config: &FileConfigAdapter,
    options: &ScanOptions,
) -> Result<ScanOutcome, SwingError> {
    validate_scan_config(config, options.symbols.is_some())?;

    let as_of = parse_as_of(options.as_of.as_deref())?;
    let scan_config = build_scan_config(config, as_of);
    let universe = resolve_universe(config, options.symbols.as_deref())?;
    let data_port = CsvAdapter::new(config.require_path("scan", "data_dir")?);
    let store = state_store(config)?;
    let reporter = CsvReportAdapter::new(report_dir(config));

    info!(
        as_of = %as_of,
        symbols = universe.count(),
        dry_run = options.dry_run,
        "starting scan"
    );

    let (report, portfolio) = if options.dry_run {
        let mut portfolio = store.load()?;
        let report = run_scan(&data_port, &universe, &mut portfolio, &scan_config);
        (report, portfolio)
    } else {
        with_portfolio(&store, |portfolio| {
            let report = run_scan(&data_port, &universe, portfolio, &scan_config);
            (report, portfolio.clone())
        })?
    };

    let report_path = reporter.write(&report)?;
    info!(path = %report_path.display(), "report written");

    Ok(ScanOutcome {
        report,
        report_path,
        portfolio,
    })
}

fn run_scan_command(config_path: &Path, options: &ScanOptions) -> Result<(), SwingError> {
    let config = load_config(config_path)?;
    let outcome = execute_scan(&config, options)?;
    print_summary(&outcome.report, outcome.portfolio.position_count());
    if options.dry_run {
        warn!("dry run: portfolio state was not saved");
    }
    Ok(())
}

fn print_summary(report: &ScanReport, open_positions: usize) {
    for decision in [Decision::Buy, Decision::Sell] {
        for row in report.rows_with(decision) {
            println!(
                "{:<4} {:<16} {:>12.2}  {}",
                decision.as_str(),
                row.symbol,
                row.close.unwrap_or_default(),
                row.reason_label()
            );
        }
    }

    let summary = report.summary();
    println!(
        "scanned {}  buy {}  sell {}  hold {}  skipped {}  failed {}  open positions {}",
        summary.scanned,
        summary.buys,
        summary.sells,
        summary.holds,
        summary.skipped,
        summary.failed,
        open_positions
    );
}

/// Table of open positions and, optionally, the closed history.
pub fn format_positions(portfolio: &Portfolio, include_closed: bool) -> String {
    let mut out = String::new();

    if portfolio.position_count() == 0 {
        out.push_str("No open positions\n");
    } else {
        out.push_str(&format!(
            "{:<16} {:<10} {:>12} {:>12} {:>12}\n",
            "SYMBOL", "ENTRY", "PRICE", "STOP", "TARGET"
        ));
        for pos in portfolio.open_positions().values() {
            out.push_str(&format!(
                "{:<16} {:<10} {:>12.2} {:>12.2} {:>12.2}\n",
                pos.symbol,
                pos.entry_date.to_string(),
                pos.entry_price,
                pos.stop_loss,
                pos.target
            ));
        }
    }

    if include_closed {
        out.push_str(&format!(
            "\nClosed positions ({})\n",
            portfolio.closed_positions().len()
        ));
        for pos in portfolio.closed_positions() {
            let exit_date = pos.exit_date.map(|d| d.to_string()).unwrap_or_default();
            let reason = pos.exit_reason.map(|r| r.as_str()).unwrap_or("");
            out.push_str(&format!(
                "{:<16} {:<10} {:<10} {:>12.2} {:>12.2} {:>8.2}% {}\n",
                pos.symbol,
                pos.entry_date.to_string(),
                exit_date,
                pos.entry_price,
                pos.exit_price.unwrap_or_default(),
                pos.realized_return_pct().unwrap_or_default(),
                reason
            ));
        }
    }

    out
}

fn run_positions(config_path: &Path, include_closed: bool) -> Result<(), SwingError> {
    let config = load_config(config_path)?;
    let store = state_store(&config)?;
    let portfolio = store.load()?;
    print!("{}", format_positions(&portfolio, include_closed));
    Ok(())
}

/// Check config, universe, price directory and state file without scanning.
pub fn validate_setup(config: &FileConfigAdapter) -> Result<Universe, SwingError> {
    validate_scan_config(config, false)?;
    let universe = resolve_universe(config, None)?;

    let data_dir = config.require_path("scan", "data_dir")?;
    let available = CsvAdapter::new(data_dir.clone()).list_symbols().map_err(|e| {
        SwingError::ConfigInvalid {
            section: "scan".into(),
            key: "data_dir".into(),
            reason: format!("{}: {}", data_dir.display(), e),
        }
    })?;
    let missing: Vec<&str> = universe
        .symbols()
        .iter()
        .filter(|s| !available.contains(*s))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        warn!(
            count = missing.len(),
            symbols = %missing.join(","),
            "universe symbols without price history"
        );
    }

    state_store(config)?.load()?;
    Ok(universe)
}

fn run_validate(config_path: &Path) -> Result<(), SwingError> {
    let config = load_config(config_path)?;
    let universe = validate_setup(&config)?;
    println!("Configuration is valid ({} symbols)", universe.count());
    Ok(())
}
