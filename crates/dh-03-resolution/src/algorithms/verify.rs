//! # Verification
//!
//! A listener's answer is accepted only if it actually satisfies the
//! request:
//!
//! | Kind | Accepted when |
//! |------|---------------|
//! | Module | component identity satisfies the requested identity reference |
//! | Type | component declares the type (assembly qualification ignored) |
//! | Resource | component carries the manifest resource |

use shared_types::{Component, ComponentIdentity, ResolveKind};

/// Whether `component` answers a `kind` request for `name`.
pub fn verify(kind: ResolveKind, name: &str, component: &Component) -> bool {
    match kind {
        ResolveKind::Module => component.identity.satisfies(&module_reference(name)),
        ResolveKind::Type => component.declares_type(strip_assembly_qualification(name)),
        ResolveKind::Resource => component.has_resource(name),
    }
}

/// Parse a module request into an identity reference.
///
/// A name that does not parse as a full identity is treated as a bare
/// simple name.
pub fn module_reference(name: &str) -> ComponentIdentity {
    name.parse()
        .unwrap_or_else(|_| ComponentIdentity::new(name.split(',').next().unwrap_or(name).trim()))
}

/// `Ns.Type, Assembly, Version=1.0` → `Ns.Type`.
///
/// Commas inside generic argument brackets are not separators.
pub fn strip_assembly_qualification(type_name: &str) -> &str {
    let mut depth = 0usize;
    for (index, c) in type_name.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return type_name[..index].trim(),
            _ => {}
        }
    }
    type_name.trim()
}
