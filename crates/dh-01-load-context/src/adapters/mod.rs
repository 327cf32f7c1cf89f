//! # Adapters
//!
//! - **file_probe**: `OsFileProbe` backed by `std::fs`

pub mod file_probe;

pub use file_probe::OsFileProbe;
