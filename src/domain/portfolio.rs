//! Portfolio state: open positions keyed by symbol plus append-only closed history.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::position::{ExitReason, Position};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortfolioError {
    #[error("position already open for {symbol}")]
    AlreadyOpen { symbol: String },

    #[error("no open position for {symbol}")]
    NotOpen { symbol: String },

    #[error("invalid position record: {reason}")]
    InvalidRecord { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    open: BTreeMap<String, Position>,
    closed: Vec<Position>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a portfolio from stored records, rejecting anything that breaks
    /// the position invariants.
    pub fn from_parts(
        open: BTreeMap<String, Position>,
        closed: Vec<Position>,
    ) -> Result<Self, PortfolioError> {
        for (symbol, position) in &open {
            if symbol != &position.symbol {
                return Err(PortfolioError::InvalidRecord {
                    reason: format!(
                        "open entry keyed {} holds position for {}",
                        symbol, position.symbol
                    ),
                });
            }
            if !position.is_open() {
                return Err(PortfolioError::InvalidRecord {
                    reason: format!("{}: open entry is not OPEN", symbol),
                });
            }
            position
                .validate()
                .map_err(|reason| PortfolioError::InvalidRecord { reason })?;
        }
        for position in &closed {
            if position.is_open() {
                return Err(PortfolioError::InvalidRecord {
                    reason: format!("{}: closed history holds an OPEN position", position.symbol),
                });
            }
            position
                .validate()
                .map_err(|reason| PortfolioError::InvalidRecord { reason })?;
        }
        Ok(Portfolio { open, closed })
    }

    /// Open a position for `symbol`. Fails without touching state if one is
    /// already open or the entry price is not a positive finite number.
    pub fn apply_buy(
        &mut self,
        symbol: &str,
        entry_price: f64,
        entry_date: NaiveDate,
    ) -> Result<&Position, PortfolioError> {
        if self.open.contains_key(symbol) {
            return Err(PortfolioError::AlreadyOpen {
                symbol: symbol.to_string(),
            });
        }
        let position = Position::open(symbol, entry_price, entry_date);
        position
            .validate()
            .map_err(|reason| PortfolioError::InvalidRecord { reason })?;
        Ok(self.open.entry(symbol.to_string()).or_insert(position))
    }

    /// Close the open position for `symbol` and append it to the history.
    /// Fails without touching state if nothing is open or the exit price is
    /// not a positive finite number.
    pub fn apply_sell(
        &mut self,
        symbol: &str,
        exit_price: f64,
        exit_date: NaiveDate,
        exit_reason: ExitReason,
    ) -> Result<&Position, PortfolioError> {
        if !is_valid_price(exit_price) {
            return Err(PortfolioError::InvalidRecord {
                reason: format!("{}: exit_price must be positive", symbol),
            });
        }
        let position = self
            .open
            .remove(symbol)
            .ok_or_else(|| PortfolioError::NotOpen {
                symbol: symbol.to_string(),
            })?;
        self.closed
            .push(position.close(exit_price, exit_date, exit_reason));
        Ok(&self.closed[self.closed.len() - 1])
    }

    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.open.get(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.open.contains_key(symbol)
    }

    pub fn position_count(&self) -> usize {
        self.open.len()
    }

    pub fn open_positions(&self) -> &BTreeMap<String, Position> {
        &self.open
    }

    pub fn closed_positions(&self) -> &[Position] {
        &self.closed
    }

    pub fn open_symbols(&self) -> impl Iterator<Item = &str> {
        self.open.keys().map(String::as_str)
    }
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
