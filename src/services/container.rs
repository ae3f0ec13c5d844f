//! Service container - wires every service on top of the two backing stores.
//!
//! Handlers only see traits; the container decides which store clients sit
//! underneath them.

use std::future::Future;
use std::sync::Arc;

use super::{
    AccountManager, AccountService, AuthService, Authenticator, OrphanSweeper, ReferenceChecks,
    RoleResolver, RoleService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{GoTrueClient, IdentityStore, ProfileStore, RestClient, TableStore};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn roles(&self) -> Arc<dyn RoleService>;

    fn accounts(&self) -> Arc<dyn AccountService>;

    /// Raw relational store for CRUD handlers
    fn tables(&self) -> Arc<dyn TableStore>;

    fn identity(&self) -> Arc<dyn IdentityStore>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    identity: Arc<dyn IdentityStore>,
    tables: Arc<dyn TableStore>,
    auth_service: Arc<dyn AuthService>,
    role_service: Arc<dyn RoleService>,
    account_service: Arc<dyn AccountService>,
    checks: Arc<ReferenceChecks>,
    sweeper: Arc<OrphanSweeper>,
}

impl Services {
    /// Wire all services over the given store clients.
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        tables: Arc<dyn TableStore>,
        jwt_secret: Option<&[u8]>,
        protected_emails: &[String],
    ) -> Self {
        let profiles = Arc::new(ProfileStore::new(tables.clone()));

        Self {
            auth_service: Arc::new(Authenticator::new(identity.clone(), jwt_secret)),
            role_service: Arc::new(RoleResolver::new(profiles.clone())),
            account_service: Arc::new(AccountManager::new(identity.clone(), profiles.clone())),
            checks: Arc::new(ReferenceChecks::new(tables.clone())),
            sweeper: Arc::new(OrphanSweeper::new(
                identity.clone(),
                profiles,
                protected_emails,
            )),
            identity,
            tables,
        }
    }

    /// Build the HTTP store clients from config and wire services over them.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let identity: Arc<dyn IdentityStore> = Arc::new(GoTrueClient::new(config)?);
        let tables: Arc<dyn TableStore> = Arc::new(RestClient::new(config)?);

        tracing::debug!(url = %config.supabase_url, "Store clients configured");

        Ok(Self::new(
            identity,
            tables,
            config.jwt_secret_bytes(),
            &config.protected_emails,
        ))
    }

    pub fn checks(&self) -> Arc<ReferenceChecks> {
        self.checks.clone()
    }

    pub fn sweeper(&self) -> Arc<OrphanSweeper> {
        self.sweeper.clone()
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn roles(&self) -> Arc<dyn RoleService> {
        self.role_service.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    fn tables(&self) -> Arc<dyn TableStore> {
        self.tables.clone()
    }

    fn identity(&self) -> Arc<dyn IdentityStore> {
        self.identity.clone()
    }
}

/// Concurrent execution of independent store calls.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    ///
    /// # Example
    /// ```ignore
    /// let (page, pet_counts) = parallel::join2(
    ///     tables.select(Table::PetOwnerProfiles, query),
    ///     tables.rpc(RPC_PET_COUNTS, json!({})),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}
