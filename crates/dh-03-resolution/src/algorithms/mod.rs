//! # Algorithms

pub mod verify;

pub use verify::{module_reference, strip_assembly_qualification, verify};
