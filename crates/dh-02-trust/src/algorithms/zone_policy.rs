//! # Zone Policy
//!
//! The default [`PolicyEngine`]: a grant derived from the evidence zone.
//!
//! | Zone | Grant |
//! |------|-------|
//! | MyComputer | Unrestricted |
//! | Intranet | Execution, Reflection, FileRead(base), Network(site) |
//! | Trusted | Execution, Reflection, Network(site) |
//! | Internet | Execution, Network(site) |
//! | Untrusted, NoZone | nothing |

use crate::domain::{GrantSet, Permission, PermissionSet, SecurityZone, TrustEvidence};
use crate::ports::PolicyEngine;
use std::path::Path;

/// Zone-based policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZonePolicy;

impl PolicyEngine for ZonePolicy {
    fn resolve(&self, evidence: &TrustEvidence, application_base: Option<&Path>) -> GrantSet {
        let site = evidence.site().map(|s| Permission::Network(s.to_string()));
        let mut set = PermissionSet::new();

        match evidence.zone() {
            SecurityZone::MyComputer => return GrantSet::Unrestricted,
            SecurityZone::Intranet => {
                set.insert(Permission::Execution);
                set.insert(Permission::Reflection);
                if let Some(base) = application_base {
                    set.insert(Permission::FileRead(base.to_path_buf()));
                }
                set.extend(site);
            }
            SecurityZone::Trusted => {
                set.insert(Permission::Execution);
                set.insert(Permission::Reflection);
                set.extend(site);
            }
            SecurityZone::Internet => {
                set.insert(Permission::Execution);
                set.extend(site);
            }
            SecurityZone::Untrusted | SecurityZone::NoZone => {}
        }

        GrantSet::Restricted(set)
    }
}
