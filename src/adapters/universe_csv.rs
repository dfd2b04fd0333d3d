//! Universe list loaded from a CSV with a `Symbol` column.

use crate::domain::universe::{Universe, UniverseError};
use std::path::Path;
use tracing::warn;

const SYMBOL_COLUMN: &str = "Symbol";

/// Read the `Symbol` column, trim, drop blanks, append `suffix` where it is
/// missing, and keep the first occurrence of each symbol.
pub fn load_universe(path: &Path, suffix: &str) -> Result<Universe, UniverseError> {
    let source_error = |reason: String| UniverseError::Source {
        path: path.display().to_string(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| source_error(e.to_string()))?;

    let headers = rdr.headers().map_err(|e| source_error(e.to_string()))?;
    let column = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(SYMBOL_COLUMN))
        .ok_or_else(|| source_error(format!("missing '{}' column", SYMBOL_COLUMN)))?;

    let suffix = suffix.trim();
    let mut raw = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| source_error(format!("row {}: {}", line + 1, e)))?;
        let symbol = record.get(column).unwrap_or("").trim();
        if symbol.is_empty() {
            continue;
        }
        raw.push(with_suffix(symbol, suffix));
    }

    let (universe, duplicates) = Universe::from_symbols(raw);
    if !duplicates.is_empty() {
        warn!(
            path = %path.display(),
            count = duplicates.len(),
            symbols = %duplicates.join(","),
            "dropped duplicate universe symbols"
        );
    }
    if universe.is_empty() {
        return Err(UniverseError::Empty);
    }
    Ok(universe)
}

/// Build a universe from a `--symbols` override. The suffix is applied the
/// same way as for the CSV file.
pub fn universe_from_override(symbols: &str, suffix: &str) -> Result<Universe, UniverseError> {
    let parsed = crate::domain::universe::parse_symbols(symbols)?;
    let suffix = suffix.trim();
    let (universe, _) = Universe::from_symbols(parsed.iter().map(|s| with_suffix(s, suffix)));
    if universe.is_empty() {
        return Err(UniverseError::Empty);
    }
    Ok(universe)
}

fn with_suffix(symbol: &str, suffix: &str) -> String {
    if suffix.is_empty() || symbol.ends_with(suffix) {
        symbol.to_string()
    } else {
        format!("{}{}", symbol, suffix)
    }
}
