//! API middleware.

mod auth;

pub use auth::{auth_middleware, require_role, require_self_or, CurrentUser};
