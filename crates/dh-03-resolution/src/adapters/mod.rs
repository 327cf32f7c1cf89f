//! # Adapters Layer

pub mod catalog;
pub mod probing;

pub use catalog::CatalogListener;
pub use probing::ProbingListener;
