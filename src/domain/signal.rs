//! BUY / SELL / HOLD decision rules.
//!
//! Entry is six independent predicates combined with AND. Exit for a held
//! symbol checks stop-loss first, then target, then the optional indicator
//! exits enabled in the [`ExitPolicy`]. Everything here is a pure function of
//! its inputs.

use std::fmt;

use crate::domain::position::{ExitReason, Position};
use crate::domain::snapshot::IndicatorSnapshot;

pub const RSI14_ENTRY_MAX: f64 = 30.0;
pub const RSI7_ENTRY_MAX: f64 = 35.0;
pub const RSI30_ENTRY_MAX: f64 = 40.0;
pub const VOLUME_EXPANSION_MULTIPLE: f64 = 2.5;
pub const DEFAULT_RSI_EXIT_LEVEL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Buy => "BUY",
            Decision::Sell => "SELL",
            Decision::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalReason {
    /// All entry predicates held.
    EntrySetup,
    /// Not held and at least one entry predicate failed.
    NoSetup,
    /// Held and no exit fired.
    Monitoring,
    Exit(ExitReason),
}

impl SignalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalReason::EntrySetup => "ENTRY_SETUP",
            SignalReason::NoSetup => "NO_SETUP",
            SignalReason::Monitoring => "MONITORING",
            SignalReason::Exit(reason) => reason.as_str(),
        }
    }
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub decision: Decision,
    pub reason: SignalReason,
}

impl Signal {
    pub fn buy() -> Self {
        Signal {
            decision: Decision::Buy,
            reason: SignalReason::EntrySetup,
        }
    }

    pub fn sell(reason: ExitReason) -> Self {
        Signal {
            decision: Decision::Sell,
            reason: SignalReason::Exit(reason),
        }
    }

    pub fn hold(reason: SignalReason) -> Self {
        Signal {
            decision: Decision::Hold,
            reason,
        }
    }
}

/// Supplementary exits on top of stop-loss and target. Both are off by default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExitPolicy {
    /// Sell when rsi14 rises above this level.
    pub rsi_exit_level: Option<f64>,
    /// Sell when close reaches the 30-day swing high.
    pub swing_high_exit: bool,
}

pub fn rsi14_oversold(snap: &IndicatorSnapshot) -> bool {
    snap.rsi14 < RSI14_ENTRY_MAX
}

pub fn rsi7_oversold(snap: &IndicatorSnapshot) -> bool {
    snap.rsi7 < RSI7_ENTRY_MAX
}

pub fn rsi30_weak(snap: &IndicatorSnapshot) -> bool {
    snap.rsi30 < RSI30_ENTRY_MAX
}

pub fn trend_filter(snap: &IndicatorSnapshot) -> bool {
    snap.close > snap.sma200 || snap.sma50 > snap.sma200
}

pub fn volume_expansion(snap: &IndicatorSnapshot) -> bool {
    snap.current_volume as f64 > VOLUME_EXPANSION_MULTIPLE * snap.avg_volume20
}

pub fn bullish_confirmation(snap: &IndicatorSnapshot) -> bool {
    snap.close > snap.open && snap.close > snap.prev_close
}

/// Outcome of each entry predicate for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryChecks {
    pub rsi14_oversold: bool,
    pub rsi7_oversold: bool,
    pub rsi30_weak: bool,
    pub trend: bool,
    pub volume_expansion: bool,
    pub bullish_confirmation: bool,
}

impl EntryChecks {
    pub fn evaluate(snap: &IndicatorSnapshot) -> Self {
        EntryChecks {
            rsi14_oversold: rsi14_oversold(snap),
            rsi7_oversold: rsi7_oversold(snap),
            rsi30_weak: rsi30_weak(snap),
            trend: trend_filter(snap),
            volume_expansion: volume_expansion(snap),
            bullish_confirmation: bullish_confirmation(snap),
        }
    }

    fn named(&self) -> [(&'static str, bool); 6] {
        [
            ("rsi14", self.rsi14_oversold),
            ("rsi7", self.rsi7_oversold),
            ("rsi30", self.rsi30_weak),
            ("trend", self.trend),
            ("volume", self.volume_expansion),
            ("candle", self.bullish_confirmation),
        ]
    }

    pub fn all(&self) -> bool {
        self.named().iter().all(|(_, ok)| *ok)
    }

    /// Names of the predicates that failed, in evaluation order.
    pub fn failed(&self) -> Vec<&'static str> {
        self.named()
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name)
            .collect()
    }
}

/// First exit that fires for an open position, in priority order.
pub fn exit_trigger(
    snap: &IndicatorSnapshot,
    position: &Position,
    policy: &ExitPolicy,
) -> Option<ExitReason> {
    if position.should_stop_loss(snap.close) {
        return Some(ExitReason::StopLoss);
    }
    if position.should_take_profit(snap.close) {
        return Some(ExitReason::TargetHit);
    }
    if let Some(level) = policy.rsi_exit_level {
        if snap.rsi14 > level {
            return Some(ExitReason::RsiExit);
        }
    }
    if policy.swing_high_exit && snap.close >= snap.swing_high30 {
        return Some(ExitReason::SwingHighExit);
    }
    None
}

/// Decide for one symbol given its snapshot and open position, if any.
pub fn evaluate(
    snap: &IndicatorSnapshot,
    position: Option<&Position>,
    policy: &ExitPolicy,
) -> Signal {
    match position {
        Some(pos) => match exit_trigger(snap, pos, policy) {
            Some(reason) => Signal::sell(reason),
            None => Signal::hold(SignalReason::Monitoring),
        },
        None if EntryChecks::evaluate(snap).all() => Signal::buy(),
        None => Signal::hold(SignalReason::NoSetup),
    }
}
