//! Admin console endpoints.
//!
//! Besides `check-role`, these keep the body-addressed account routes the
//! admin console still calls; they share their work with the resource
//! handlers.

use axum::{
    extract::State,
    response::Json,
    routing::post,
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth_handler::owner_barangay;
use super::notification_handler::create_notification;
use super::personnel_handler::create_personnel;
use super::pet_owner_handler::create_pet_owner;
use crate::api::extractors::ApiJson;
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Role, ADMIN_ONLY};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckRoleRequest {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckRoleResponse {
    pub role: Role,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub barangay: Option<Option<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonnelRequest {
    pub id: Uuid,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub updated_record: Map<String, Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AccountIdRequest {
    pub id: Uuid,
}

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/check-role", post(check_role))
        .route("/pet-owner", post(create_pet_owner))
        .route(
            "/personnel",
            post(create_personnel)
                .put(update_personnel_by_body)
                .delete(delete_personnel_by_body),
        )
        .route("/notifications", post(create_notification))
}

/// Resolve the role of any user
#[utoipa::path(
    post,
    path = "/api/admin/check-role",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CheckRoleRequest,
    responses(
        (status = 200, description = "Resolved role", body = CheckRoleResponse),
        (status = 400, description = "userId missing"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn check_role(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<CheckRoleRequest>,
) -> AppResult<Json<CheckRoleResponse>> {
    require_role(&current_user, ADMIN_ONLY)?;
    let user_id = payload
        .user_id
        .ok_or_else(|| AppError::bad_request("userId is required"))?;

    let resolved = state.role_service.resolve(user_id).await?;
    Ok(Json(CheckRoleResponse {
        role: resolved.role(),
        name: resolved.display_name(),
        barangay: owner_barangay(&resolved),
    }))
}

/// Update a personnel account addressed in the body
#[utoipa::path(
    put,
    path = "/api/admin/personnel",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = UpdatePersonnelRequest,
    responses(
        (status = 200, description = "Updated profile rows"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn update_personnel_by_body(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<UpdatePersonnelRequest>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, ADMIN_ONLY)?;
    let data = state
        .account_service
        .update_personnel(payload.id, payload.updated_record)
        .await?;
    Ok(Json(json!({ "data": data })))
}

/// Delete a personnel account addressed in the body
#[utoipa::path(
    delete,
    path = "/api/admin/personnel",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = AccountIdRequest,
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn delete_personnel_by_body(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<AccountIdRequest>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, ADMIN_ONLY)?;
    state.account_service.delete_account(payload.id).await?;
    Ok(Json(json!({ "data": {} })))
}
