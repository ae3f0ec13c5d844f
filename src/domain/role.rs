//! Roles and the resolved role of an authenticated caller.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PersonnelProfile, PetOwnerProfile};
use crate::config::ADMIN_DISPLAY_NAME;

/// Portal roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Personnel,
    PetOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Personnel => "personnel",
            Role::PetOwner => "pet-owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admins and personnel.
pub const STAFF: &[Role] = &[Role::Admin, Role::Personnel];

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Outcome of role resolution for one user id.
///
/// Admin carries no profile: it is the absence of a row in both profile
/// tables.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRole {
    Admin,
    Personnel(PersonnelProfile),
    PetOwner(PetOwnerProfile),
}

impl ResolvedRole {
    pub fn role(&self) -> Role {
        match self {
            ResolvedRole::Admin => Role::Admin,
            ResolvedRole::Personnel(_) => Role::Personnel,
            ResolvedRole::PetOwner(_) => Role::PetOwner,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            ResolvedRole::Admin => ADMIN_DISPLAY_NAME.to_string(),
            ResolvedRole::Personnel(profile) => profile.full_name(),
            ResolvedRole::PetOwner(profile) => profile.full_name(),
        }
    }

    /// Barangay of a pet owner; other roles have none.
    pub fn barangay(&self) -> Option<&str> {
        match self {
            ResolvedRole::PetOwner(profile) => profile.barangay.as_deref(),
            _ => None,
        }
    }

    pub fn is_one_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role())
    }
}
