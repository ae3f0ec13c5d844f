//! PetVac API - pet vaccination record keeping
//!
//! Backend for the admin, personnel and pet-owner portals. Accounts live in a
//! hosted identity service; every business record lives in a hosted
//! relational store reached over its REST interface.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Accounts, roles and the relations of the record store
//! - **services**: Role resolution, account provisioning, sweeps and statistics
//! - **infra**: Identity service and REST table clients
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # List identity users without a profile
//! cargo run -- accounts sweep-orphans --dry-run
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{ResolvedRole, Role};
pub use errors::{AppError, AppResult};
