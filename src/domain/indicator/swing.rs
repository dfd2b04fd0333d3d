//! Highest high over a trailing window (swing high), current bar included.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_highest_high(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::HighestHigh(period);
    if period == 0 {
        return IndicatorSeries::all_invalid(indicator_type, bars.iter().map(|b| b.date));
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i + 1 < period {
                return IndicatorPoint::invalid(bar.date);
            }
            let highest = bars[i + 1 - period..=i]
                .iter()
                .map(|b| b.high)
                .fold(f64::NEG_INFINITY, f64::max);
            IndicatorPoint::valid(bar.date, highest)
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
