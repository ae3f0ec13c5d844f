//! Role resolution: which portal an authenticated user belongs to.
//!
//! Personnel if the id has a `PersonnelProfiles` row, pet owner if it has a
//! `PetOwnerProfiles` row, admin otherwise. Evaluated on every request.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::domain::ResolvedRole;
use crate::errors::AppResult;
use crate::infra::ProfileRepository;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleService: Send + Sync {
    /// Resolve exactly one role. Store failures propagate; they never
    /// degrade to admin.
    async fn resolve(&self, user_id: Uuid) -> AppResult<ResolvedRole>;
}

pub struct RoleResolver {
    profiles: Arc<dyn ProfileRepository>,
}

impl RoleResolver {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl RoleService for RoleResolver {
    async fn resolve(&self, user_id: Uuid) -> AppResult<ResolvedRole> {
        if let Some(profile) = self.profiles.find_personnel(user_id).await? {
            return Ok(ResolvedRole::Personnel(profile));
        }
        if let Some(profile) = self.profiles.find_pet_owner(user_id).await? {
            return Ok(ResolvedRole::PetOwner(profile));
        }
        tracing::debug!(user_id = %user_id, "No profile row, resolving as admin");
        Ok(ResolvedRole::Admin)
    }
}
