//! Price-history access port trait.

use crate::domain::error::SwingError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` within `[start_date, end_date]`, sorted by date ascending.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingError>;

    fn list_symbols(&self) -> Result<Vec<String>, SwingError>;
}
