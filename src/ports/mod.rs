//! Port traits: the boundaries between the scanning core and file I/O.

pub mod config_port;
pub mod data_port;
pub mod report_port;
pub mod state_port;
