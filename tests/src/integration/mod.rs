//! # Integration Tests
//!
//! Scenarios that span several subsystems, driven through the public
//! lifecycle API the way a host would.

pub mod cross_domain;
pub mod lifecycle;
pub mod observers;
pub mod resolution;
pub mod scenarios;
