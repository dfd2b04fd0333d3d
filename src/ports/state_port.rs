//! Portfolio persistence port and scoped load/save.

use crate::domain::error::SwingError;
use crate::domain::portfolio::Portfolio;

pub trait StatePort {
    /// Read the persisted portfolio. A store that has never been written yields
    /// an empty portfolio; anything unreadable or malformed is an error.
    fn load(&self) -> Result<Portfolio, SwingError>;

    /// Replace the persisted portfolio atomically.
    fn save(&self, portfolio: &Portfolio) -> Result<(), SwingError>;
}

/// Load the portfolio, hand it to `run`, then write it back.
///
/// The save happens whenever `run` returns, so per-symbol failures recorded
/// inside it never skip persistence. If the load fails `run` is not called and
/// nothing is written.
pub fn with_portfolio<T>(
    store: &dyn StatePort,
    run: impl FnOnce(&mut Portfolio) -> T,
) -> Result<T, SwingError> {
    let mut portfolio = store.load()?;
    let output = run(&mut portfolio);
    store.save(&portfolio)?;
    Ok(output)
}
