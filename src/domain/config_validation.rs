//! Configuration validation.
//!
//! Validates all config fields before a scan touches the filesystem.

use crate::domain::error::SwingError;
use crate::domain::snapshot::MIN_HISTORY_BARS;
use crate::ports::config_port::ConfigPort;

/// Extra calendar days for exchange holidays, which remove roughly 10 to 15
/// sessions a year on top of weekends.
pub const HOLIDAY_MARGIN_DAYS: i64 = 30;

/// Calendar days that reliably contain [`MIN_HISTORY_BARS`] trading days:
/// five sessions per seven days plus [`HOLIDAY_MARGIN_DAYS`].
pub const MIN_LOOKBACK_DAYS: i64 =
    (MIN_HISTORY_BARS * 7).div_ceil(5) as i64 + HOLIDAY_MARGIN_DAYS;

pub fn validate_scan_config(
    config: &dyn ConfigPort,
    has_symbol_override: bool,
) -> Result<(), SwingError> {
    validate_required(config, "scan", "data_dir")?;
    if !has_symbol_override {
        validate_required(config, "scan", "universe")?;
    }
    validate_required(config, "portfolio", "state_file")?;
    validate_lookback(config)?;
    validate_symbol_suffix(config)?;
    validate_rsi_exit_level(config)?;
    Ok(())
}

fn validate_required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), SwingError> {
    config.require_string(section, key).map(|_| ())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), SwingError> {
    let value = config.get_int("scan", "lookback_days", crate::domain::scan::DEFAULT_LOOKBACK_DAYS);
    if value < MIN_LOOKBACK_DAYS {
        return Err(SwingError::ConfigInvalid {
            section: "scan".to_string(),
            key: "lookback_days".to_string(),
            reason: format!(
                "lookback_days must be at least {} calendar days to cover {} trading days with holidays",
                MIN_LOOKBACK_DAYS, MIN_HISTORY_BARS
            ),
        });
    }
    Ok(())
}

fn validate_symbol_suffix(config: &dyn ConfigPort) -> Result<(), SwingError> {
    match config.get_string("scan", "symbol_suffix") {
        Some(s) if s.trim().chars().any(|c| c.is_whitespace() || c == ',') => {
            Err(SwingError::ConfigInvalid {
                section: "scan".to_string(),
                key: "symbol_suffix".to_string(),
                reason: "symbol_suffix must not contain whitespace or commas".to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn validate_rsi_exit_level(config: &dyn ConfigPort) -> Result<(), SwingError> {
    let value = config.get_double(
        "exit",
        "rsi_exit_level",
        crate::domain::signal::DEFAULT_RSI_EXIT_LEVEL,
    );
    if value <= 0.0 || value >= 100.0 {
        return Err(SwingError::ConfigInvalid {
            section: "exit".to_string(),
            key: "rsi_exit_level".to_string(),
            reason: "rsi_exit_level must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}
