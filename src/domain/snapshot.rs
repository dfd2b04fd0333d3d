//! Latest-bar indicator snapshot consumed by the signal generator.

use chrono::NaiveDate;

use crate::domain::error::SwingError;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::swing::calculate_highest_high;
use crate::domain::indicator::volume::calculate_volume_average;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const RSI_FAST: usize = 7;
pub const RSI_STANDARD: usize = 14;
pub const RSI_SLOW: usize = 30;
pub const SMA_MEDIUM: usize = 50;
pub const SMA_LONG: usize = 200;
pub const VOLUME_AVG_PERIOD: usize = 20;
pub const SWING_HIGH_PERIOD: usize = 30;

/// Every indicator the snapshot needs.
pub const SNAPSHOT_INDICATORS: [IndicatorType; 7] = [
    IndicatorType::Rsi(RSI_FAST),
    IndicatorType::Rsi(RSI_STANDARD),
    IndicatorType::Rsi(RSI_SLOW),
    IndicatorType::Sma(SMA_MEDIUM),
    IndicatorType::Sma(SMA_LONG),
    IndicatorType::VolumeAvg(VOLUME_AVG_PERIOD),
    IndicatorType::HighestHigh(SWING_HIGH_PERIOD),
];

/// Shortest series that yields a complete snapshot.
pub const MIN_HISTORY_BARS: usize = max_warmup();

const fn max_warmup() -> usize {
    let mut max = 2;
    let mut i = 0;
    while i < SNAPSHOT_INDICATORS.len() {
        let w = SNAPSHOT_INDICATORS[i].warmup();
        if w > max {
            max = w;
        }
        i += 1;
    }
    max
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub date: NaiveDate,
    pub rsi7: f64,
    pub rsi14: f64,
    pub rsi30: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub avg_volume20: f64,
    pub current_volume: i64,
    pub close: f64,
    pub open: f64,
    pub prev_close: f64,
    pub swing_high30: f64,
}

impl IndicatorSnapshot {
    /// Build the snapshot for the last bar of `bars`.
    ///
    /// Fails with `InsufficientData` when the history is shorter than
    /// [`MIN_HISTORY_BARS`] or any indicator is still warming up at the last bar.
    pub fn compute(symbol: &str, bars: &[OhlcvBar]) -> Result<Self, SwingError> {
        let insufficient = || SwingError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum: MIN_HISTORY_BARS,
        };

        if bars.len() < MIN_HISTORY_BARS {
            return Err(insufficient());
        }

        let latest = |series: IndicatorSeries| series.latest().ok_or_else(insufficient);

        let last = &bars[bars.len() - 1];
        let prev = &bars[bars.len() - 2];

        Ok(IndicatorSnapshot {
            symbol: symbol.to_string(),
            date: last.date,
            rsi7: latest(calculate_rsi(bars, RSI_FAST))?,
            rsi14: latest(calculate_rsi(bars, RSI_STANDARD))?,
            rsi30: latest(calculate_rsi(bars, RSI_SLOW))?,
            sma50: latest(calculate_sma(bars, SMA_MEDIUM))?,
            sma200: latest(calculate_sma(bars, SMA_LONG))?,
            avg_volume20: latest(calculate_volume_average(bars, VOLUME_AVG_PERIOD))?,
            current_volume: last.volume,
            close: last.close,
            open: last.open,
            prev_close: prev.close,
            swing_high30: latest(calculate_highest_high(bars, SWING_HIGH_PERIOD))?,
        })
    }

    /// current_volume / avg_volume20, or 0 when there is no baseline volume.
    pub fn volume_multiple(&self) -> f64 {
        if self.avg_volume20 <= 0.0 {
            return 0.0;
        }
        self.current_volume as f64 / self.avg_volume20
    }
}
