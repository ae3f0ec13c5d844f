//! Admin notification handlers.

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::api::extractors::{ApiJson, ApiQuery};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Table, ADMIN_ONLY, STAFF};
use crate::errors::AppResult;
use crate::infra::{Order, Query, QueryResult};
use crate::types::DataEnvelope;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteNotificationsQuery {
    /// Delete one notification; all of them when absent
    pub id: Option<i64>,
}

/// Create notification routes
pub fn notification_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(list_notifications)
            .post(create_notification)
            .delete(delete_notifications),
    )
}

/// Notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notifications", body = DataEnvelope),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<DataEnvelope>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .select(
            Table::AdminNotifications,
            Query::new().select("*").order("created_at", Order::Desc),
        )
        .await?;
    Ok(Json(DataEnvelope::ok(result.data)))
}

/// Post a notification
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Inserted", body = QueryResult))
)]
pub async fn create_notification(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<QueryResult>> {
    let result = state
        .tables
        .insert(Table::AdminNotifications, body, Query::new())
        .await?;
    Ok(Json(result))
}

/// Delete one notification, or all of them
#[utoipa::path(
    delete,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(DeleteNotificationsQuery),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn delete_notifications(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<DeleteNotificationsQuery>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, ADMIN_ONLY)?;

    // The store refuses unfiltered deletes, so "all" matches every id.
    let filter = match query.id {
        Some(id) => Query::new().eq("id", id),
        None => Query::new().not_null("id"),
    };
    let result = state.tables.delete(Table::AdminNotifications, filter).await?;
    tracing::info!(id = ?query.id, "Notifications deleted");
    Ok(Json(result.data))
}
