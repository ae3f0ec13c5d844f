//! Infrastructure layer - clients for the hosted stores.
//!
//! - `rest`: relational store (tables, views, RPC) over its REST surface
//! - `identity`: identity store admin API
//! - `profiles`: typed profile-table repository built on `rest`

pub mod identity;
pub mod profiles;
pub mod rest;

pub use identity::{GoTrueClient, IdentityStore};
pub use profiles::{ProfileRepository, ProfileStore};
pub use rest::{Order, Query, QueryResult, RestClient, TableStore};

#[cfg(any(test, feature = "test-utils"))]
pub use identity::MockIdentityStore;
#[cfg(any(test, feature = "test-utils"))]
pub use profiles::MockProfileRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use rest::MockTableStore;
