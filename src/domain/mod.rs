//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod snapshot;
pub mod signal;
pub mod position;
pub mod portfolio;
pub mod universe;
pub mod scan;
pub mod config_validation;
pub mod error;
