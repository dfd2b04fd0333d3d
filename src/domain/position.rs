//! Position records and their risk levels.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// stop_loss = round2(entry_price * STOP_LOSS_FACTOR)
pub const STOP_LOSS_FACTOR: f64 = 0.93;
/// target = round2(entry_price * TARGET_FACTOR)
pub const TARGET_FACTOR: f64 = 1.10;

/// Round a price level to cents.
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Stop-loss and target for an entry price, rounded to cents.
pub fn risk_levels(entry_price: f64) -> (f64, f64) {
    (
        round_price(entry_price * STOP_LOSS_FACTOR),
        round_price(entry_price * TARGET_FACTOR),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    TargetHit,
    RsiExit,
    SwingHighExit,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TargetHit => "TARGET_HIT",
            ExitReason::RsiExit => "RSI_EXIT",
            ExitReason::SwingHighExit => "SWING_HIGH_EXIT",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub status: PositionStatus,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub exit_reason: Option<ExitReason>,
}

impl Position {
    /// A fresh OPEN position with stop-loss and target derived from the entry.
    pub fn open(symbol: &str, entry_price: f64, entry_date: NaiveDate) -> Self {
        let (stop_loss, target) = risk_levels(entry_price);
        Position {
            symbol: symbol.to_string(),
            entry_date,
            entry_price,
            stop_loss,
            target,
            status: PositionStatus::Open,
            exit_date: None,
            exit_price: None,
            exit_reason: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        price <= self.stop_loss
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        price >= self.target
    }

    /// Consume the open position and produce its CLOSED record.
    pub(crate) fn close(
        self,
        exit_price: f64,
        exit_date: NaiveDate,
        exit_reason: ExitReason,
    ) -> Position {
        Position {
            status: PositionStatus::Closed,
            exit_date: Some(exit_date),
            exit_price: Some(exit_price),
            exit_reason: Some(exit_reason),
            ..self
        }
    }

    /// Percent gain from entry to `price`.
    pub fn return_pct(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * 100.0
    }

    /// Percent gain realised at exit; `None` while open.
    pub fn realized_return_pct(&self) -> Option<f64> {
        self.exit_price.map(|p| self.return_pct(p))
    }

    /// Check the field-level invariants a stored record must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.entry_price.is_finite() && self.entry_price > 0.0) {
            return Err(format!("{}: entry_price must be positive", self.symbol));
        }
        let (expected_stop, expected_target) = risk_levels(self.entry_price);
        if !approx_eq(self.stop_loss, expected_stop) {
            return Err(format!(
                "{}: stop_loss {} does not match entry_price * {}",
                self.symbol, self.stop_loss, STOP_LOSS_FACTOR
            ));
        }
        if !approx_eq(self.target, expected_target) {
            return Err(format!(
                "{}: target {} does not match entry_price * {}",
                self.symbol, self.target, TARGET_FACTOR
            ));
        }
        let exit_fields = [
            self.exit_date.is_some(),
            self.exit_price.is_some(),
            self.exit_reason.is_some(),
        ];
        match self.status {
            PositionStatus::Open if exit_fields.iter().any(|&f| f) => {
                Err(format!("{}: open position carries exit fields", self.symbol))
            }
            PositionStatus::Closed if !exit_fields.iter().all(|&f| f) => {
                Err(format!("{}: closed position is missing exit fields", self.symbol))
            }
            PositionStatus::Closed
                if !self.exit_price.is_some_and(|p| p.is_finite() && p > 0.0) =>
            {
                Err(format!("{}: exit_price must be positive", self.symbol))
            }
            _ => Ok(()),
        }
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * b.abs().max(1.0)
}
