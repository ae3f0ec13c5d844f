//! Application state - Dependency injection container.
//!
//! Provides handlers with the services and the raw store clients.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{IdentityStore, TableStore};
use crate::services::{
    AccountService, AuthService, ReferenceChecks, RoleService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Bearer token verification
    pub auth_service: Arc<dyn AuthService>,
    /// Per-request role resolution
    pub role_service: Arc<dyn RoleService>,
    /// Identity user + profile lifecycle
    pub account_service: Arc<dyn AccountService>,
    /// Relational store for plain CRUD
    pub tables: Arc<dyn TableStore>,
    /// Identity store, used directly by the health check
    pub identity: Arc<dyn IdentityStore>,
    pub checks: Arc<ReferenceChecks>,
}

impl AppState {
    /// Create application state with HTTP store clients built from config.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let services = Services::from_config(config)?;
        Ok(Self::from_services(&services))
    }

    /// Create application state from an already wired container.
    pub fn from_services(services: &Services) -> Self {
        Self {
            auth_service: services.auth(),
            role_service: services.roles(),
            account_service: services.accounts(),
            tables: services.tables(),
            identity: services.identity(),
            checks: services.checks(),
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        role_service: Arc<dyn RoleService>,
        account_service: Arc<dyn AccountService>,
        tables: Arc<dyn TableStore>,
        identity: Arc<dyn IdentityStore>,
    ) -> Self {
        let checks = Arc::new(ReferenceChecks::new(tables.clone()));
        Self {
            auth_service,
            role_service,
            account_service,
            tables,
            identity,
            checks,
        }
    }
}
