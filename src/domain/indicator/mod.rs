//! Technical indicator implementations.
//!
//! Every calculator maps a bar slice to an [`IndicatorSeries`] of the same
//! length. Points inside the warmup window are marked invalid rather than
//! carrying a made-up value.

pub mod rsi;
pub mod sma;
pub mod volume;
pub mod swing;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub fn valid(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    VolumeAvg(usize),
    HighestHigh(usize),
}

impl IndicatorType {
    /// Bars needed before the first valid point.
    pub const fn warmup(&self) -> usize {
        match *self {
            IndicatorType::Sma(n) | IndicatorType::HighestHigh(n) => n,
            IndicatorType::Rsi(n) | IndicatorType::VolumeAvg(n) => n + 1,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::VolumeAvg(period) => write!(f, "VOLUME_AVG({})", period),
            IndicatorType::HighestHigh(period) => write!(f, "HIGHEST_HIGH({})", period),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at the last bar, or `None` if the series is empty or still warming up.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().filter(|p| p.valid).map(|p| p.value)
    }

    pub(crate) fn all_invalid(
        indicator_type: IndicatorType,
        dates: impl Iterator<Item = NaiveDate>,
    ) -> Self {
        IndicatorSeries {
            indicator_type,
            values: dates.map(IndicatorPoint::invalid).collect(),
        }
    }
}
