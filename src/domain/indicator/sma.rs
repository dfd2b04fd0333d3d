//! Simple Moving Average of close.
//!
//! O(n) sliding window: add the new close, drop the one leaving the window.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Sma(period);
    if period == 0 {
        return IndicatorSeries::all_invalid(indicator_type, bars.iter().map(|b| b.date));
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }

        if i + 1 >= period {
            values.push(IndicatorPoint::valid(bar.date, window_sum / period as f64));
        } else {
            values.push(IndicatorPoint::invalid(bar.date));
        }
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
