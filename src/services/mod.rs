//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic over the identity and relational
//! stores. They depend on the store traits, never on the HTTP clients.

mod account_service;
mod auth_service;
pub mod container;
mod directory;
mod orphan_sweep;
mod reference_checks;
mod role_service;
pub mod saga;
pub mod statistics;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{
    AccountManager, AccountService, EmailChange, NewAccount, ProvisionedAccount,
};
pub use auth_service::{AuthService, Authenticator, Claims};
pub use directory::{collect_all_users, find_user_by_email};
pub use orphan_sweep::{OrphanSweeper, SweepReport};
pub use reference_checks::{CascadeCheck, ReferenceChecks};
pub use role_service::{RoleResolver, RoleService};

#[cfg(any(test, feature = "test-utils"))]
pub use account_service::MockAccountService;
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use role_service::MockRoleService;
