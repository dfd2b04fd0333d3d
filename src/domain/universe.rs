//! Scan universe: an ordered, de-duplicated list of symbols.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Universe {
    symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("universe file {path}: {reason}")]
    Source { path: String, reason: String },

    #[error("universe is empty")]
    Empty,
}

impl Universe {
    /// Keep the first occurrence of each symbol, dropping blanks. Returns the
    /// universe and the duplicates that were discarded.
    pub fn from_symbols<I, S>(symbols: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut duplicates = Vec::new();

        for symbol in symbols {
            let symbol = symbol.as_ref().trim();
            if symbol.is_empty() {
                continue;
            }
            if seen.insert(symbol.to_string()) {
                kept.push(symbol.to_string());
            } else {
                duplicates.push(symbol.to_string());
            }
        }

        (Universe { symbols: kept }, duplicates)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Universe order, followed by held symbols that are not in the universe
    /// (sorted) so their exits are still checked.
    pub fn scan_order<'a>(&'a self, held: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        let mut order: Vec<&str> = self.symbols.iter().map(String::as_str).collect();
        let mut extra: Vec<&str> = held.filter(|s| !self.contains(s)).collect();
        extra.sort_unstable();
        extra.dedup();
        order.extend(extra);
        order
    }
}

/// Parse a comma-separated symbol override such as `--symbols INFY,TCS`.
/// Symbols are upper-cased; empty tokens and repeats are rejected.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
