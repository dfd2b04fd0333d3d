//! JSON portfolio state file.
//!
//! Layout: `{"version": 1, "open": {SYMBOL: record}, "closed": [record]}`.
//! Saves go through a temp file in the same directory and a rename, so a crash
//! mid-write leaves the previous state in place.

use crate::domain::error::SwingError;
use crate::domain::portfolio::Portfolio;
use crate::domain::position::{ExitReason, Position, PositionStatus};
use crate::ports::state_port::StatePort;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StateFile {
    version: u32,
    #[serde(default)]
    open: BTreeMap<String, PositionRecord>,
    #[serde(default)]
    closed: Vec<PositionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PositionRecord {
    symbol: String,
    entry_date: NaiveDate,
    entry_price: f64,
    stop_loss: f64,
    target: f64,
    status: PositionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_reason: Option<ExitReason>,
}

impl From<&Position> for PositionRecord {
    fn from(p: &Position) -> Self {
        PositionRecord {
            symbol: p.symbol.clone(),
            entry_date: p.entry_date,
            entry_price: p.entry_price,
            stop_loss: p.stop_loss,
            target: p.target,
            status: p.status,
            exit_date: p.exit_date,
            exit_price: p.exit_price,
            exit_reason: p.exit_reason,
        }
    }
}

impl From<PositionRecord> for Position {
    fn from(r: PositionRecord) -> Self {
        Position {
            symbol: r.symbol,
            entry_date: r.entry_date,
            entry_price: r.entry_price,
            stop_loss: r.stop_loss,
            target: r.target,
            status: r.status,
            exit_date: r.exit_date,
            exit_price: r.exit_price,
            exit_reason: r.exit_reason,
        }
    }
}

pub struct JsonStateAdapter {
    path: PathBuf,
}

impl JsonStateAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persistence_error(&self, reason: impl ToString) -> SwingError {
        SwingError::Persistence {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn write_atomic(&self, state: &StateFile) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, state)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl StatePort for JsonStateAdapter {
    fn load(&self) -> Result<Portfolio, SwingError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file, starting empty");
                return Ok(Portfolio::new());
            }
            Err(e) => return Err(self.persistence_error(e)),
        };

        let state: StateFile =
            serde_json::from_str(&content).map_err(|e| self.persistence_error(e))?;
        if state.version != STATE_VERSION {
            return Err(self.persistence_error(format!(
                "unsupported state version {} (expected {})",
                state.version, STATE_VERSION
            )));
        }

        let open = state
            .open
            .into_iter()
            .map(|(symbol, record)| (symbol, Position::from(record)))
            .collect();
        let closed = state.closed.into_iter().map(Position::from).collect();

        let portfolio =
            Portfolio::from_parts(open, closed).map_err(|e| self.persistence_error(e))?;
        debug!(
            path = %self.path.display(),
            open = portfolio.position_count(),
            closed = portfolio.closed_positions().len(),
            "loaded portfolio state"
        );
        Ok(portfolio)
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), SwingError> {
        let state = StateFile {
            version: STATE_VERSION,
            open: portfolio
                .open_positions()
                .iter()
                .map(|(symbol, p)| (symbol.clone(), PositionRecord::from(p)))
                .collect(),
            closed: portfolio
                .closed_positions()
                .iter()
                .map(PositionRecord::from)
                .collect(),
        };

        self.write_atomic(&state)
            .map_err(|e| self.persistence_error(format!("save failed: {}", e)))?;
        debug!(path = %self.path.display(), "saved portfolio state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn sample_portfolio() -> Portfolio {
        let mut p = Portfolio::new();
        p.apply_buy("INFY.NS", 1500.0, d(3, 1)).unwrap();
        p.apply_buy("TCS.NS", 3812.35, d(3, 4)).unwrap();
        p.apply_buy("WIPRO.NS", 480.1, d(3, 5)).unwrap();
        p.apply_sell("TCS.NS", 4200.0, d(3, 20), ExitReason::TargetHit)
            .unwrap();
        p
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateAdapter::new(dir.path().join("portfolio.json"));
        let portfolio = store.load().unwrap();
        assert_eq!(portfolio, Portfolio::new());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateAdapter::new(dir.path().join("state/portfolio.json"));
        let portfolio = sample_portfolio();

        store.save(&portfolio).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, portfolio);
        assert_eq!(loaded.position_count(), 2);
        assert_eq!(loaded.closed_positions().len(), 1);
        assert_eq!(
            loaded.closed_positions()[0].exit_reason,
            Some(ExitReason::TargetHit)
        );
    }

    #[test]
    fn saved_file_uses_documented_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        let store = JsonStateAdapter::new(path.clone());
        store.save(&sample_portfolio()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["open"]["INFY.NS"]["status"], "OPEN");
        assert_eq!(value["open"]["INFY.NS"]["entry_date"], "2024-03-01");
        assert!(value["open"]["INFY.NS"].get("exit_reason").is_none());
        assert_eq!(value["closed"][0]["status"], "CLOSED");
        assert_eq!(value["closed"][0]["exit_reason"], "TARGET_HIT");
    }

    #[test]
    fn save_replaces_previous_state_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        let store = JsonStateAdapter::new(path.clone());

        store.save(&sample_portfolio()).unwrap();
        store.save(&Portfolio::new()).unwrap();

        assert_eq!(store.load().unwrap(), Portfolio::new());
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn corrupt_file_fails_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        fs::write(&path, "{\"version\": 1, \"open\": {").unwrap();

        let err = JsonStateAdapter::new(path).load().unwrap_err();
        assert!(matches!(err, SwingError::Persistence { .. }));
    }

    #[test]
    fn unknown_version_fails_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        fs::write(&path, r#"{"version": 2, "open": {}, "closed": []}"#).unwrap();

        let err = JsonStateAdapter::new(path).load().unwrap_err();
        assert!(err.to_string().contains("unsupported state version 2"));
    }

    #[test]
    fn unknown_field_fails_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        fs::write(
            &path,
            r#"{"version": 1, "open": {"INFY": {"symbol": "INFY", "entry_date": "2024-03-01",
                "entry_price": 100.0, "stop_loss": 93.0, "target": 110.0,
                "status": "OPEN", "quantity": 10}}, "closed": []}"#,
        )
        .unwrap();

        assert!(JsonStateAdapter::new(path).load().is_err());
    }

    #[test]
    fn inconsistent_record_fails_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        // Closed status inside the open map.
        fs::write(
            &path,
            r#"{"version": 1, "open": {"INFY": {"symbol": "INFY", "entry_date": "2024-03-01",
                "entry_price": 100.0, "stop_loss": 93.0, "target": 110.0,
                "status": "CLOSED", "exit_date": "2024-03-05", "exit_price": 92.0,
                "exit_reason": "STOP_LOSS"}}, "closed": []}"#,
        )
        .unwrap();

        let err = JsonStateAdapter::new(path).load().unwrap_err();
        assert!(err.to_string().contains("INFY"));
    }

    #[test]
    fn failed_save_reports_persistence_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the state file should be makes the rename fail.
        let path = dir.path().join("portfolio.json");
        fs::create_dir(&path).unwrap();

        let err = JsonStateAdapter::new(path.clone())
            .save(&sample_portfolio())
            .unwrap_err();
        assert!(matches!(err, SwingError::Persistence { .. }));
        assert!(path.is_dir());
    }

    #[test]
    fn failed_save_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.json");
        let store = JsonStateAdapter::new(path.clone());
        store.save(&sample_portfolio()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        // Parent path blocked by a regular file: nothing can be staged.
        let blocked = JsonStateAdapter::new(path.join("nested.json"));
        assert!(blocked.save(&Portfolio::new()).is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(store.load().unwrap(), sample_portfolio());
    }

    const SYMBOLS: [&str; 5] = ["INFY.NS", "TCS.NS", "M&M.NS", "BAJAJ-AUTO.NS", "AAPL"];
    const REASONS: [ExitReason; 4] = [
        ExitReason::StopLoss,
        ExitReason::TargetHit,
        ExitReason::RsiExit,
        ExitReason::SwingHighExit,
    ];

    #[derive(Debug, Clone)]
    enum Op {
        Buy(usize, f64, i64),
        Sell(usize, f64, i64, usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..SYMBOLS.len(), 0.01f64..1e7, 0i64..3650)
                .prop_map(|(s, p, day)| Op::Buy(s, p, day)),
            (0usize..SYMBOLS.len(), 0.01f64..1e7, 0i64..3650, 0usize..REASONS.len())
                .prop_map(|(s, p, day, r)| Op::Sell(s, p, day, r)),
        ]
    }

    fn portfolio_from(ops: &[Op]) -> Portfolio {
        let base = d(1, 1);
        let mut portfolio = Portfolio::new();
        for op in ops {
            match *op {
                Op::Buy(s, price, day) => {
                    let _ = portfolio.apply_buy(
                        SYMBOLS[s],
                        price,
                        base + chrono::Duration::days(day),
                    );
                }
                Op::Sell(s, price, day, r) => {
                    let _ = portfolio.apply_sell(
                        SYMBOLS[s],
                        price,
                        base + chrono::Duration::days(day),
                        REASONS[r],
                    );
                }
            }
        }
        portfolio
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_traded_portfolio_reloads_identically(
            ops in prop::collection::vec(op_strategy(), 0..40)
        ) {
            let portfolio = portfolio_from(&ops);
            let dir = TempDir::new().unwrap();
            let store = JsonStateAdapter::new(dir.path().join("portfolio.json"));

            store.save(&portfolio).unwrap();
            let loaded = store.load().unwrap();

            prop_assert_eq!(&loaded, &portfolio);
            let pairs = loaded.closed_positions().iter().zip(portfolio.closed_positions());
            for (reloaded, original) in pairs {
                prop_assert_eq!(
                    reloaded.exit_price.map(f64::to_bits),
                    original.exit_price.map(f64::to_bits)
                );
                prop_assert_eq!(reloaded.stop_loss.to_bits(), original.stop_loss.to_bits());
            }
        }
    }
}
