//! Bearer token authentication and role gating.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::{ResolvedRole, Role};
use crate::errors::AppError;

/// Authenticated user with the role resolved for this request
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub resolved: ResolvedRole,
}

impl CurrentUser {
    pub fn role(&self) -> Role {
        self.resolved.role()
    }
}

/// Authentication middleware.
///
/// Verifies the bearer token, resolves the caller's role from the profile
/// tables and injects a [`CurrentUser`] into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let user = state.auth_service.authenticate(token).await?;
    let resolved = state.role_service.resolve(user.id).await?;

    tracing::debug!(user_id = %user.id, role = %resolved.role(), "Request authenticated");

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        resolved,
    });

    Ok(next.run(request).await)
}

/// Require one of `allowed`, returns Forbidden otherwise.
pub fn require_role(user: &CurrentUser, allowed: &[Role]) -> Result<(), AppError> {
    if user.resolved.is_one_of(allowed) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, role = %user.role(), "Role not allowed");
        Err(AppError::Forbidden)
    }
}

/// Require the caller to be `owner` or to hold one of `allowed`.
pub fn require_self_or(user: &CurrentUser, owner: Uuid, allowed: &[Role]) -> Result<(), AppError> {
    if user.id == owner {
        Ok(())
    } else {
        require_role(user, allowed)
    }
}
