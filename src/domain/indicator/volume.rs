//! Trailing average volume.
//!
//! The average at bar i covers bars [i-n, i), so the current bar's own volume
//! never dilutes the baseline it is compared against.
//! Warmup: first n bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_volume_average(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::VolumeAvg(period);
    if period == 0 {
        return IndicatorSeries::all_invalid(indicator_type, bars.iter().map(|b| b.date));
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum: i64 = 0;

    for (i, bar) in bars.iter().enumerate() {
        if i >= period {
            values.push(IndicatorPoint::valid(
                bar.date,
                window_sum as f64 / period as f64,
            ));
            window_sum -= bars[i - period].volume;
        } else {
            values.push(IndicatorPoint::invalid(bar.date));
        }
        window_sum += bar.volume;
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
