#![allow(dead_code)]

use chrono::NaiveDate;
pub use swingscan::domain::ohlcv::OhlcvBar;
use swingscan::domain::error::SwingError;
use swingscan::ports::data_port::DataPort;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingError::NoData {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn series_start() -> NaiveDate {
    date(2023, 1, 2)
}

/// One bar per calendar day from [`series_start`], open = close, volume 1000.
pub fn bars_from_closes(symbol: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            symbol: symbol.to_string(),
            date: series_start() + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        })
        .collect()
}

/// 220 rising days, 15 falling days, then a high-volume green reversal bar.
///
/// Latest bar: RSI7 ~4.7, RSI14 ~9.2, RSI30 ~21, SMA50 ~195.8 above SMA200
/// ~165.4, volume 3x the 20-day average, close 165 above open and prior close.
pub fn buy_setup_bars(symbol: &str) -> Vec<OhlcvBar> {
    let mut closes: Vec<f64> = (0..220).map(|i| 100.0 + 0.5 * i as f64).collect();
    closes.extend((220..235).map(|i| 209.5 - 3.0 * (i - 219) as f64));
    closes.push(165.0);

    let mut bars = bars_from_closes(symbol, &closes);
    if let Some(last) = bars.last_mut() {
        last.open = 164.75;
        last.volume = 3_000;
    }
    bars
}

/// `count` flat bars at `base`, with the final close replaced by `last_close`.
pub fn flat_bars_ending_at(symbol: &str, count: usize, base: f64, last_close: f64) -> Vec<OhlcvBar> {
    let mut closes = vec![base; count];
    if let Some(last) = closes.last_mut() {
        *last = last_close;
    }
    bars_from_closes(symbol, &closes)
}

pub fn last_date(bars: &[OhlcvBar]) -> NaiveDate {
    bars.last().map(|b| b.date).unwrap()
}

/// Write bars as `{dir}/{SYMBOL}.csv` in the price-history layout.
pub fn write_price_csv(dir: &Path, bars: &[OhlcvBar]) {
    let symbol = &bars[0].symbol;
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
