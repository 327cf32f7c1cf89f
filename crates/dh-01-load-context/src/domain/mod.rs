//! # Domain Layer for Load Context
//!
//! ## Contents
//!
//! - **entities**: `LoadContext`, its builder and the sealed `LoadContextSnapshot`
//! - **value_objects**: `ShadowCopySettings`, `ProbePlan`, `SealedField`, `Initializer`
//! - **invariants**: path and name checks
//! - **errors**: `LoadContextError`

mod entities;
mod errors;
mod invariants;
mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
