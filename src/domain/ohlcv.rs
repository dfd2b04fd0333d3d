//! Daily OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// True when dates are strictly increasing. Gaps (weekends, holidays) are fine.
pub fn is_strictly_ascending(bars: &[OhlcvBar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: (i32, u32, u32), open: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            symbol: "RELIANCE.NS".into(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 50_000,
        }
    }

    #[test]
    fn ascending_tolerates_gaps() {
        let bars = vec![
            bar((2024, 1, 12), 100.0, 101.0),
            bar((2024, 1, 15), 101.0, 102.0),
            bar((2024, 1, 16), 102.0, 103.0),
        ];
        assert!(is_strictly_ascending(&bars));
    }

    #[test]
    fn duplicate_dates_are_not_ascending() {
        let bars = vec![
            bar((2024, 1, 15), 100.0, 101.0),
            bar((2024, 1, 15), 101.0, 102.0),
        ];
        assert!(!is_strictly_ascending(&bars));
    }
}
