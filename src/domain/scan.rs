//! Scan orchestration: fetch, snapshot, signal and portfolio mutation, once per symbol.

use chrono::NaiveDate;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::error::SwingError;
use crate::domain::ohlcv::is_strictly_ascending;
use crate::domain::portfolio::Portfolio;
use crate::domain::signal::{self, Decision, EntryChecks, ExitPolicy, Signal, SignalReason};
use crate::domain::snapshot::{IndicatorSnapshot, MIN_HISTORY_BARS};
use crate::domain::universe::Universe;
use crate::ports::data_port::DataPort;

/// Calendar days of history requested by default; comfortably more than
/// [`MIN_HISTORY_BARS`] trading days.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 400;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub as_of: NaiveDate,
    pub lookback_days: i64,
    pub exit_policy: ExitPolicy,
}

impl ScanConfig {
    pub fn new(as_of: NaiveDate) -> Self {
        ScanConfig {
            as_of,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            exit_policy: ExitPolicy::default(),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.as_of - chrono::Duration::days(self.lookback_days)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    Signal(Signal),
    /// Symbol not evaluated this run (missing or insufficient data).
    Skipped(String),
    /// Price source failed outright, or applying the decision violated a
    /// portfolio invariant.
    Error(String),
}

/// One output row per symbol per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub symbol: String,
    pub date: Option<NaiveDate>,
    pub status: RowStatus,
    pub close: Option<f64>,
    pub rsi7: Option<f64>,
    pub rsi14: Option<f64>,
    pub rsi30: Option<f64>,
    pub volume_multiple: Option<f64>,
}

impl ScanRow {
    fn skipped(symbol: &str, reason: String) -> Self {
        ScanRow {
            symbol: symbol.to_string(),
            date: None,
            status: RowStatus::Skipped(reason),
            close: None,
            rsi7: None,
            rsi14: None,
            rsi30: None,
            volume_multiple: None,
        }
    }

    fn failed(symbol: &str, reason: String) -> Self {
        ScanRow {
            status: RowStatus::Error(reason),
            ..ScanRow::skipped(symbol, String::new())
        }
    }

    fn evaluated(snap: &IndicatorSnapshot, status: RowStatus) -> Self {
        ScanRow {
            symbol: snap.symbol.clone(),
            date: Some(snap.date),
            status,
            close: Some(snap.close),
            rsi7: Some(snap.rsi7),
            rsi14: Some(snap.rsi14),
            rsi30: Some(snap.rsi30),
            volume_multiple: Some(snap.volume_multiple()),
        }
    }

    pub fn decision(&self) -> Option<Decision> {
        match &self.status {
            RowStatus::Signal(s) => Some(s.decision),
            _ => None,
        }
    }

    pub fn decision_label(&self) -> &'static str {
        match &self.status {
            RowStatus::Signal(s) => s.decision.as_str(),
            RowStatus::Skipped(_) => "SKIPPED",
            RowStatus::Error(_) => "ERROR",
        }
    }

    pub fn reason_label(&self) -> String {
        match &self.status {
            RowStatus::Signal(s) => s.reason.to_string(),
            RowStatus::Skipped(reason) | RowStatus::Error(reason) => reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanSummary {
    pub scanned: usize,
    pub buys: usize,
    pub sells: usize,
    pub holds: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub as_of: NaiveDate,
    pub rows: Vec<ScanRow>,
}

impl ScanReport {
    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary {
            scanned: self.rows.len(),
            ..ScanSummary::default()
        };
        for row in &self.rows {
            match &row.status {
                RowStatus::Signal(s) => match s.decision {
                    Decision::Buy => summary.buys += 1,
                    Decision::Sell => summary.sells += 1,
                    Decision::Hold => summary.holds += 1,
                },
                RowStatus::Skipped(_) => summary.skipped += 1,
                RowStatus::Error(_) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn rows_with(&self, decision: Decision) -> impl Iterator<Item = &ScanRow> {
        self.rows
            .iter()
            .filter(move |row| row.decision() == Some(decision))
    }
}

/// Evaluate one symbol and apply its decision to the portfolio.
pub fn scan_symbol(
    data_port: &dyn DataPort,
    symbol: &str,
    portfolio: &mut Portfolio,
    config: &ScanConfig,
) -> ScanRow {
    let bars = match data_port.fetch_ohlcv(symbol, config.start_date(), config.as_of) {
        Ok(bars) if bars.is_empty() => {
            warn!(symbol, "skipping: no price history");
            return ScanRow::skipped(symbol, "no price history".to_string());
        }
        Ok(bars) => bars,
        Err(e) if e.is_skippable() => {
            warn!(symbol, error = %e, "skipping: fetch failed");
            return ScanRow::skipped(symbol, e.to_string());
        }
        Err(e) => {
            error!(symbol, "fetch failed: {e}");
            return ScanRow::failed(symbol, e.to_string());
        }
    };

    if !is_strictly_ascending(&bars) {
        warn!(symbol, "skipping: bar dates are not strictly increasing");
        return ScanRow::skipped(symbol, "bar dates are not strictly increasing".to_string());
    }

    let snap = match IndicatorSnapshot::compute(symbol, &bars) {
        Ok(snap) => snap,
        Err(e) => {
            warn!(symbol, bars = bars.len(), minimum = MIN_HISTORY_BARS, "skipping: {e}");
            return ScanRow::skipped(symbol, e.to_string());
        }
    };

    let signal = signal::evaluate(&snap, portfolio.get_position(symbol), &config.exit_policy);

    let applied = match (signal.decision, signal.reason) {
        (Decision::Buy, _) => portfolio
            .apply_buy(symbol, snap.close, snap.date)
            .map(|pos| {
                info!(
                    symbol,
                    price = pos.entry_price,
                    stop_loss = pos.stop_loss,
                    target = pos.target,
                    "BUY"
                );
            }),
        (Decision::Sell, SignalReason::Exit(reason)) => portfolio
            .apply_sell(symbol, snap.close, snap.date, reason)
            .map(|pos| {
                info!(
                    symbol,
                    price = snap.close,
                    reason = %reason,
                    return_pct = pos.realized_return_pct().unwrap_or_default(),
                    "SELL"
                );
            }),
        _ => {
            if signal.reason == SignalReason::NoSetup {
                debug!(symbol, failed = ?EntryChecks::evaluate(&snap).failed(), "HOLD");
            }
            Ok(())
        }
    };

    match applied {
        Ok(()) => ScanRow::evaluated(&snap, RowStatus::Signal(signal)),
        Err(e) => {
            let err = SwingError::from(e);
            error!(symbol, decision = %signal.decision, "{err}");
            ScanRow::evaluated(&snap, RowStatus::Error(err.to_string()))
        }
    }
}

/// Scan every universe symbol, plus held symbols outside the universe, in order.
#[instrument(skip_all, fields(as_of = %config.as_of, universe = universe.count()))]
pub fn run_scan(
    data_port: &dyn DataPort,
    universe: &Universe,
    portfolio: &mut Portfolio,
    config: &ScanConfig,
) -> ScanReport {
    let order: Vec<String> = universe
        .scan_order(portfolio.open_symbols())
        .into_iter()
        .map(String::from)
        .collect();

    info!("scanning {} symbols", order.len());

    let rows = order
        .iter()
        .map(|symbol| scan_symbol(data_port, symbol, portfolio, config))
        .collect();

    let report = ScanReport {
        as_of: config.as_of,
        rows,
    };

    let summary = report.summary();
    info!(
        scanned = summary.scanned,
        buys = summary.buys,
        sells = summary.sells,
        skipped = summary.skipped,
        failed = summary.failed,
        "scan complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use std::collections::HashMap;

    struct FixedData(HashMap<String, Vec<OhlcvBar>>);

    impl DataPort for FixedData {
        fn fetch_ohlcv(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<OhlcvBar>, SwingError> {
            self.0.get(symbol).cloned().ok_or_else(|| SwingError::NoData {
                symbol: symbol.to_string(),
                reason: "not found".into(),
            })
        }

        fn list_symbols(&self) -> Result<Vec<String>, SwingError> {
            Ok(self.0.keys().cloned().collect())
        }
    }

    fn flat_bars(symbol: &str, count: usize, close: f64) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..count)
            .map(|i| OhlcvBar {
                symbol: symbol.to_string(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn config() -> ScanConfig {
        ScanConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn start_date_uses_lookback() {
        let cfg = config();
        assert_eq!(cfg.start_date(), NaiveDate::from_ymd_opt(2022, 11, 27).unwrap());
    }

    #[test]
    fn missing_symbol_is_skipped() {
        let data = FixedData(HashMap::new());
        let mut portfolio = Portfolio::new();
        let row = scan_symbol(&data, "NOPE", &mut portfolio, &config());
        assert_eq!(row.decision_label(), "SKIPPED");
        assert!(row.reason_label().contains("not found"));
        assert_eq!(row.close, None);
    }

    struct BrokenData;

    impl DataPort for BrokenData {
        fn fetch_ohlcv(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<OhlcvBar>, SwingError> {
            Err(SwingError::Io(std::io::Error::other("disk unplugged")))
        }

        fn list_symbols(&self) -> Result<Vec<String>, SwingError> {
            Ok(vec![])
        }
    }

    #[test]
    fn source_failure_is_an_error_row() {
        let mut portfolio = Portfolio::new();
        let row = scan_symbol(&BrokenData, "INFY", &mut portfolio, &config());
        assert_eq!(row.decision_label(), "ERROR");
        assert!(row.reason_label().contains("disk unplugged"));
        assert_eq!(row.date, None);
    }

    #[test]
    fn short_history_is_skipped() {
        let mut map = HashMap::new();
        map.insert("TCS".to_string(), flat_bars("TCS", 150, 100.0));
        let mut portfolio = Portfolio::new();
        let row = scan_symbol(&FixedData(map), "TCS", &mut portfolio, &config());
        assert!(matches!(row.status, RowStatus::Skipped(ref r) if r.contains("insufficient data")));
    }

    #[test]
    fn unordered_bars_are_skipped() {
        let mut bars = flat_bars("TCS", 210, 100.0);
        bars.swap(10, 11);
        let mut map = HashMap::new();
        map.insert("TCS".to_string(), bars);
        let mut portfolio = Portfolio::new();
        let row = scan_symbol(&FixedData(map), "TCS", &mut portfolio, &config());
        assert_eq!(row.decision_label(), "SKIPPED");
    }

    #[test]
    fn flat_market_holds() {
        let mut map = HashMap::new();
        map.insert("TCS".to_string(), flat_bars("TCS", 210, 100.0));
        let mut portfolio = Portfolio::new();
        let row = scan_symbol(&FixedData(map), "TCS", &mut portfolio, &config());
        assert_eq!(row.status, RowStatus::Signal(Signal::hold(SignalReason::NoSetup)));
        assert_eq!(row.rsi14, Some(100.0));
        assert_eq!(row.volume_multiple, Some(1.0));
        assert_eq!(portfolio.position_count(), 0);
    }

    #[test]
    fn held_symbol_hits_stop() {
        let mut map = HashMap::new();
        map.insert("TCS".to_string(), flat_bars("TCS", 210, 90.0));
        let mut portfolio = Portfolio::new();
        portfolio
            .apply_buy("TCS", 100.0, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap())
            .unwrap();

        let row = scan_symbol(&FixedData(map), "TCS", &mut portfolio, &config());
        assert_eq!(row.decision_label(), "SELL");
        assert_eq!(row.reason_label(), "STOP_LOSS");
        assert!(!portfolio.has_position("TCS"));
        assert_eq!(portfolio.closed_positions()[0].exit_price, Some(90.0));
    }

    #[test]
    fn summary_counts_each_status() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let base = ScanRow::skipped("A", "no data".into());
        let report = ScanReport {
            as_of: d,
            rows: vec![
                base.clone(),
                ScanRow { status: RowStatus::Signal(Signal::buy()), ..base.clone() },
                ScanRow { status: RowStatus::Signal(Signal::hold(SignalReason::NoSetup)), ..base.clone() },
                ScanRow { status: RowStatus::Error("boom".into()), ..base.clone() },
            ],
        };
        let summary = report.summary();
        assert_eq!(
            summary,
            ScanSummary { scanned: 4, buys: 1, sells: 0, holds: 1, skipped: 1, failed: 1 }
        );
        assert_eq!(report.rows_with(Decision::Buy).count(), 1);
    }
}
