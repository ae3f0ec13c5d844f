//! In-memory stand-ins for the identity service and the record store.
//!
//! The table fake understands the filters the services actually send
//! (`eq`, `is.null`, `not.is.null`) plus row windows; anything else is
//! treated as matching.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use uuid::Uuid;

use petvac_api::api::{create_router, AppState};
use petvac_api::domain::{AuthUser, AuthUserUpdate, NewAuthUser, Table};
use petvac_api::errors::{AppError, AppResult};
use petvac_api::infra::{IdentityStore, Query, QueryResult, TableStore};
use petvac_api::services::Services;

// =============================================================================
// Identity store
// =============================================================================

#[derive(Default)]
pub struct FakeIdentity {
    users: Mutex<Vec<AuthUser>>,
    tokens: Mutex<HashMap<String, Uuid>>,
    failing_deletes: Mutex<HashSet<Uuid>>,
}

impl FakeIdentity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a user directly, bypassing provisioning.
    pub fn add_user(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().push(AuthUser {
            id,
            email: Some(email.to_string()),
            email_confirmed_at: None,
            created_at: None,
        });
        id
    }

    /// Add a user reachable through `token`.
    pub fn add_session(&self, email: &str, token: &str) -> Uuid {
        let id = self.add_user(email);
        self.tokens.lock().unwrap().insert(token.to_string(), id);
        id
    }

    pub fn fail_delete_of(&self, id: Uuid) {
        self.failing_deletes.lock().unwrap().insert(id);
    }

    pub fn has_user(&self, id: Uuid) -> bool {
        self.users.lock().unwrap().iter().any(|u| u.id == id)
    }

    pub fn email_of(&self, id: Uuid) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .and_then(|u| u.email.clone())
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityStore for FakeIdentity {
    async fn create_user(&self, user: NewAuthUser) -> AppResult<AuthUser> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.has_email(&user.email)) {
            return Err(AppError::upstream(
                422,
                Some("email_exists".into()),
                "A user with this email address has already been registered",
            ));
        }
        let created = AuthUser {
            id: Uuid::new_v4(),
            email: Some(user.email),
            email_confirmed_at: None,
            created_at: None,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn list_users(&self, page: u32, per_page: u32) -> AppResult<Vec<AuthUser>> {
        let users = self.users.lock().unwrap();
        let start = ((page.max(1) - 1) * per_page) as usize;
        Ok(users
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<AuthUser>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn update_user(&self, id: Uuid, update: AuthUserUpdate) -> AppResult<AuthUser> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::upstream(404, None, "User not found"))?;
        if let Some(email) = update.email {
            user.email = Some(email);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        if self.failing_deletes.lock().unwrap().contains(&id) {
            return Err(AppError::upstream(500, None, "delete failed"));
        }
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(AppError::upstream(404, None, "User not found"));
        }
        Ok(())
    }

    async fn get_user_by_token(&self, token: &str) -> AppResult<AuthUser> {
        let id = self
            .tokens
            .lock()
            .unwrap()
            .get(token)
            .copied()
            .ok_or(AppError::Unauthorized)?;
        self.get_user(id).await?.ok_or(AppError::Unauthorized)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Record store
// =============================================================================

#[derive(Default)]
pub struct FakeTables {
    rows: Mutex<HashMap<Table, Vec<Value>>>,
    failing_inserts: Mutex<HashSet<Table>>,
}

impl FakeTables {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, table: Table, row: Value) {
        self.rows.lock().unwrap().entry(table).or_default().push(row);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.rows
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fail_inserts_into(&self, table: Table) {
        self.failing_inserts.lock().unwrap().insert(table);
    }

    pub fn allow_inserts_into(&self, table: Table) {
        self.failing_inserts.lock().unwrap().remove(&table);
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches(row: &Value, query: &Query) -> bool {
    query.filters().iter().all(|(column, filter)| {
        let cell = row.get(column).and_then(cell_text);
        if let Some(expected) = filter.strip_prefix("eq.") {
            cell.as_deref() == Some(expected)
        } else if filter == "is.null" {
            cell.is_none()
        } else if filter == "not.is.null" {
            cell.is_some()
        } else {
            true
        }
    })
}

fn merge(row: &mut Value, patch: &Value) {
    if let (Value::Object(row), Value::Object(patch)) = (row, patch) {
        for (key, value) in patch {
            row.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl TableStore for FakeTables {
    async fn select(&self, table: Table, query: Query) -> AppResult<QueryResult> {
        let rows = self.rows(table);
        let matched: Vec<Value> = rows.into_iter().filter(|r| matches(r, &query)).collect();
        let count = matched.len() as u64;
        let window: Vec<Value> = match query.range_window() {
            Some((offset, limit)) => matched
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            None => matched,
        };
        Ok(QueryResult::new(Value::Array(window), Some(count), 200))
    }

    async fn insert(&self, table: Table, rows: Value, _query: Query) -> AppResult<QueryResult> {
        if self.failing_inserts.lock().unwrap().contains(&table) {
            return Err(AppError::upstream(500, Some("XX000".into()), "insert failed"));
        }
        let new_rows = match rows {
            Value::Array(rows) => rows,
            row => vec![row],
        };
        self.rows
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .extend(new_rows.iter().cloned());
        Ok(QueryResult::new(Value::Array(new_rows), None, 201))
    }

    async fn update(&self, table: Table, patch: Value, query: Query) -> AppResult<QueryResult> {
        let mut store = self.rows.lock().unwrap();
        let mut updated = Vec::new();
        for row in store.entry(table).or_default().iter_mut() {
            if matches(row, &query) {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        Ok(QueryResult::new(Value::Array(updated), None, 200))
    }

    async fn delete(&self, table: Table, query: Query) -> AppResult<QueryResult> {
        let mut store = self.rows.lock().unwrap();
        let rows = store.entry(table).or_default();
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| matches(row, &query));
        *rows = kept;
        Ok(QueryResult::new(Value::Array(removed), None, 200))
    }

    async fn rpc(&self, _function: &str, _args: Value) -> AppResult<Value> {
        Ok(json!([]))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Wiring
// =============================================================================

pub const PROTECTED_EMAIL: &str = "admin@petvac.test";

pub fn services(identity: &Arc<FakeIdentity>, tables: &Arc<FakeTables>) -> Services {
    let identity: Arc<dyn IdentityStore> = identity.clone();
    let tables: Arc<dyn TableStore> = tables.clone();
    Services::new(identity, tables, None, &[PROTECTED_EMAIL.to_string()])
}

pub fn app(identity: &Arc<FakeIdentity>, tables: &Arc<FakeTables>) -> Router {
    create_router(AppState::from_services(&services(identity, tables)))
}

/// Seed a pet owner profile for `id`.
pub fn seed_pet_owner(tables: &FakeTables, id: Uuid, barangay: &str) {
    tables.seed(
        Table::PetOwnerProfiles,
        json!({
            "id": id.to_string(),
            "first_name": "Juan",
            "last_name": "Dela Cruz",
            "barangay": barangay,
        }),
    );
}

/// Seed a personnel profile for `id`.
pub fn seed_personnel(tables: &FakeTables, id: Uuid) {
    tables.seed(
        Table::PersonnelProfiles,
        json!({
            "id": id.to_string(),
            "first_name": "Maria",
            "last_name": "Santos",
        }),
    );
}
