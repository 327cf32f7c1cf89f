//! # Domain Host Test Suite
//!
//! Cross-crate integration tests and shared fixtures.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Hosts, domains and listeners used by many tests
//! └── integration/      # Cross-subsystem scenarios
//!     ├── scenarios.rs  # End-to-end walkthroughs
//!     ├── lifecycle.rs  # Creation, sandboxing, unload draining
//!     ├── resolution.rs # Listener ordering and fault isolation
//!     ├── cross_domain.rs
//!     └── observers.rs  # Lifecycle bus
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dh-tests
//! cargo test -p dh-tests integration::lifecycle::
//! cargo bench -p dh-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
