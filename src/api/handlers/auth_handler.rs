//! Caller role and account credential handlers.

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::extractors::{ApiJson, ApiQuery};
use crate::api::middleware::{require_self_or, CurrentUser};
use crate::api::AppState;
use crate::domain::{ProfileKind, ResolvedRole, Role, ADMIN_ONLY, STAFF};
use crate::errors::{AppError, AppResult};
use crate::services::EmailChange;
use crate::types::SuccessResponse;

/// Caller identity as shown by the portals
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleUser {
    pub id: Uuid,
    #[schema(example = "Juan Dela Cruz")]
    pub name: String,
    /// Present for pet owners only
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub barangay: Option<Option<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub role: Role,
    pub user: RoleUser,
}

impl RoleResponse {
    pub fn new(id: Uuid, resolved: &ResolvedRole) -> Self {
        Self {
            role: resolved.role(),
            user: RoleUser {
                id,
                name: resolved.display_name(),
                barangay: owner_barangay(resolved),
            },
        }
    }
}

/// `Some(barangay)` for pet owners, even when the column is empty.
pub(crate) fn owner_barangay(resolved: &ResolvedRole) -> Option<Option<String>> {
    match resolved {
        ResolvedRole::PetOwner(_) => Some(resolved.barangay().map(str::to_string)),
        _ => None,
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct UserQuery {
    /// Defaults to the caller
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmailResponse {
    pub email: String,
}

/// Credential change request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCredentialsRequest {
    /// Defaults to the caller
    pub user_id: Option<Uuid>,
    /// `email` or `password`
    #[schema(example = "email")]
    pub edit_type: String,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Restored if the profile update fails
    pub current_email: Option<String>,
    /// `PersonnelProfiles` or `PetOwnerProfiles`
    pub profile_table: Option<String>,
}

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/role", get(get_role))
        .route("/user", get(get_user_email).patch(update_credentials))
}

/// Role and display name of the caller
#[utoipa::path(
    get,
    path = "/api/auth/role",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Resolved role", body = RoleResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_role(Extension(current_user): Extension<CurrentUser>) -> Json<RoleResponse> {
    Json(RoleResponse::new(current_user.id, &current_user.resolved))
}

/// Email of an account
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "Auth",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "Account email", body = EmailResponse),
        (status = 403, description = "Not the caller's account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_email(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<Json<EmailResponse>> {
    let user_id = query.user_id.unwrap_or(current_user.id);
    require_self_or(&current_user, user_id, STAFF)?;

    let email = state.account_service.email_of(user_id).await?;
    Ok(Json(EmailResponse { email }))
}

/// Change an account's email or password
#[utoipa::path(
    patch,
    path = "/api/auth/user",
    tag = "Auth",
    security(("bearer_auth" = [])),
    request_body = UpdateCredentialsRequest,
    responses(
        (status = 200, description = "Updated", body = SuccessResponse),
        (status = 400, description = "Invalid editType or missing value"),
        (status = 403, description = "Not the caller's account")
    )
)]
pub async fn update_credentials(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<UpdateCredentialsRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let user_id = payload.user_id.unwrap_or(current_user.id);
    require_self_or(&current_user, user_id, ADMIN_ONLY)?;

    match payload.edit_type.as_str() {
        "email" => {
            let profile = payload
                .profile_table
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| {
                    ProfileKind::from_table_name(t)
                        .ok_or_else(|| AppError::bad_request("Invalid profileTable"))
                })
                .transpose()?;
            state
                .account_service
                .change_email(EmailChange {
                    user_id,
                    email: payload.email.unwrap_or_default(),
                    previous_email: payload.current_email,
                    profile,
                })
                .await?;
        }
        "password" => {
            state
                .account_service
                .change_password(user_id, payload.password.unwrap_or_default())
                .await?;
        }
        _ => return Err(AppError::bad_request("Invalid editType")),
    }

    Ok(Json(SuccessResponse::ok()))
}
