//! swingscan: daily equity swing-trading scanner.
//!
//! Hexagonal architecture: indicator, signal and portfolio logic in [`domain`],
//! port traits in [`ports`], concrete file-backed implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
