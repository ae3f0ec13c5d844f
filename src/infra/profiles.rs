//! Typed access to the two profile tables.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::rest::{Order, Query, TableStore};
use crate::domain::{NewProfile, PersonnelProfile, PetOwnerProfile, ProfileKind};
use crate::errors::{AppError, AppResult};

/// Rows fetched per request when collecting every profile id.
const ID_SCAN_PAGE: u64 = 1000;

/// Profile table operations used by role resolution and account services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_personnel(&self, id: Uuid) -> AppResult<Option<PersonnelProfile>>;

    async fn find_pet_owner(&self, id: Uuid) -> AppResult<Option<PetOwnerProfile>>;

    /// Whether `kind`'s table has a row with this id.
    async fn exists(&self, kind: ProfileKind, id: Uuid) -> AppResult<bool>;

    /// Whether `kind`'s table already has a row with this email.
    async fn email_registered(&self, kind: ProfileKind, email: &str) -> AppResult<bool>;

    /// Insert the profile row for identity user `id`, returning the stored row(s).
    async fn insert(&self, id: Uuid, profile: NewProfile) -> AppResult<Value>;

    async fn update(&self, kind: ProfileKind, id: Uuid, patch: Value) -> AppResult<Value>;

    /// Every id present in `kind`'s table.
    async fn ids(&self, kind: ProfileKind) -> AppResult<HashSet<Uuid>>;
}

/// [`ProfileRepository`] over the relational store.
pub struct ProfileStore {
    tables: Arc<dyn TableStore>,
}

impl ProfileStore {
    pub fn new(tables: Arc<dyn TableStore>) -> Self {
        Self { tables }
    }

    async fn find<T: DeserializeOwned>(
        &self,
        kind: ProfileKind,
        id: Uuid,
    ) -> AppResult<Option<T>> {
        let result = self
            .tables
            .select(
                kind.table(),
                Query::new()
                    .select(kind.summary_columns())
                    .eq("id", id)
                    .range(0, 1),
            )
            .await?;

        result
            .into_rows()
            .into_iter()
            .next()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    AppError::internal(format!("Malformed {} row: {}", kind.table(), e))
                })
            })
            .transpose()
    }
}

#[async_trait]
impl ProfileRepository for ProfileStore {
    async fn find_personnel(&self, id: Uuid) -> AppResult<Option<PersonnelProfile>> {
        self.find(ProfileKind::Personnel, id).await
    }

    async fn find_pet_owner(&self, id: Uuid) -> AppResult<Option<PetOwnerProfile>> {
        self.find(ProfileKind::PetOwner, id).await
    }

    async fn exists(&self, kind: ProfileKind, id: Uuid) -> AppResult<bool> {
        let result = self
            .tables
            .select(kind.table(), Query::new().select("id").eq("id", id).range(0, 1))
            .await?;
        Ok(!result.is_empty())
    }

    async fn email_registered(&self, kind: ProfileKind, email: &str) -> AppResult<bool> {
        let result = self
            .tables
            .select(
                kind.table(),
                Query::new().select("id").eq("email", email.trim()).range(0, 1),
            )
            .await?;
        Ok(!result.is_empty())
    }

    async fn insert(&self, id: Uuid, profile: NewProfile) -> AppResult<Value> {
        let table = profile.kind().table();
        let row = profile.into_row(id)?;
        let result = self
            .tables
            .insert(table, row, Query::new().returning())
            .await?;
        Ok(result.data)
    }

    async fn update(&self, kind: ProfileKind, id: Uuid, patch: Value) -> AppResult<Value> {
        let result = self
            .tables
            .update(kind.table(), patch, Query::new().eq("id", id).returning())
            .await?;
        Ok(result.data)
    }

    async fn ids(&self, kind: ProfileKind) -> AppResult<HashSet<Uuid>> {
        let mut ids = HashSet::new();
        let mut offset = 0;
        loop {
            let page = self
                .tables
                .select(
                    kind.table(),
                    Query::new()
                        .select("id")
                        .order("id", Order::Asc)
                        .range(offset, ID_SCAN_PAGE),
                )
                .await?;
            let rows = page.rows();
            ids.extend(
                rows.iter()
                    .filter_map(|row| row.get("id").and_then(Value::as_str))
                    .filter_map(|raw| Uuid::parse_str(raw).ok()),
            );
            if (rows.len() as u64) < ID_SCAN_PAGE {
                break;
            }
            offset += ID_SCAN_PAGE;
        }
        Ok(ids)
    }
}
