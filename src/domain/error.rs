//! Domain error types.

use crate::domain::portfolio::PortfolioError;
use crate::domain::universe::UniverseError;

/// Top-level error type for swingscan.
#[derive(Debug, thiserror::Error)]
pub enum SwingError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("no data for {symbol}: {reason}")]
    NoData { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("portfolio invariant violated: {0}")]
    InvariantViolation(#[from] PortfolioError),

    #[error("portfolio state {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SwingError {
    /// Per-symbol conditions that skip a symbol without failing the scan.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            SwingError::NoData { .. } | SwingError::InsufficientData { .. }
        )
    }
}

impl From<&SwingError> for std::process::ExitCode {
    fn from(err: &SwingError) -> Self {
        let code: u8 = match err {
            SwingError::Io(_) | SwingError::Report { .. } => 1,
            SwingError::ConfigParse { .. }
            | SwingError::ConfigMissing { .. }
            | SwingError::ConfigInvalid { .. }
            | SwingError::Universe(_) => 2,
            SwingError::Persistence { .. } => 3,
            SwingError::NoData { .. } | SwingError::InsufficientData { .. } => 5,
            SwingError::InvariantViolation(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
