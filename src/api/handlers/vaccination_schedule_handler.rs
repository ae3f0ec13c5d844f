//! Vaccination schedule handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch},
    Extension, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::api::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Table, STAFF};
use crate::errors::AppResult;
use crate::infra::{Order, Query, QueryResult};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ScheduleQuery {
    pub location: Option<String>,
    /// `true` keeps schedules starting today or later, soonest first
    pub for_appointment: Option<bool>,
}

/// Create vaccination schedule routes
pub fn vaccination_schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/:id", patch(update_schedule).delete(delete_schedule))
}

/// List schedules
#[utoipa::path(
    get,
    path = "/api/vaccination-schedule",
    tag = "Vaccination Schedule",
    security(("bearer_auth" = [])),
    params(ScheduleQuery),
    responses((status = 200, description = "Schedules", body = QueryResult))
)]
pub async fn list_schedules(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScheduleQuery>,
) -> AppResult<Json<QueryResult>> {
    let mut select = Query::new()
        .select("*")
        .eq_opt("location", query.location.as_deref());
    if query.for_appointment.unwrap_or(false) {
        let today = Utc::now().date_naive();
        select = select
            .gte("start_date", today.format("%Y-%m-%d"))
            .order("start_date", Order::Asc);
    }
    let result = state.tables.select(Table::VaccinationSchedule, select).await?;
    Ok(Json(result))
}

/// Create a schedule
#[utoipa::path(
    post,
    path = "/api/vaccination-schedule",
    tag = "Vaccination Schedule",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inserted", body = QueryResult),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .insert(Table::VaccinationSchedule, body, Query::new())
        .await?;
    Ok(Json(result))
}

/// Update a schedule
#[utoipa::path(
    patch,
    path = "/api/vaccination-schedule/{id}",
    tag = "Vaccination Schedule",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .update(Table::VaccinationSchedule, patch, Query::new().eq("id", id))
        .await?;
    Ok(Json(result.data))
}

/// Delete a schedule
#[utoipa::path(
    delete,
    path = "/api/vaccination-schedule/{id}",
    tag = "Vaccination Schedule",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .delete(Table::VaccinationSchedule, Query::new().eq("id", id))
        .await?;
    Ok(Json(result.data))
}
