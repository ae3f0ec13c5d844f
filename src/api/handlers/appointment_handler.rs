//! Appointment handlers.

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::{get, patch},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::required;
use crate::api::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Table, STAFF};
use crate::errors::{AppError, AppResult};
use crate::infra::{Order, Query, QueryResult};
use crate::types::PageParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentQuery {
    /// `view` (default), `records`, `by-owner` or `check`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Ticket number fragment (`view`)
    pub search: Option<String>,
    pub vaccine_sched_id: Option<i64>,
    /// Slot time (`records`)
    pub time: Option<String>,
    /// Owner (`by-owner`, `check`)
    #[serde(alias = "ownerId")]
    pub owner_id: Option<Uuid>,
    pub pet_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AppointmentStatusRequest {
    #[schema(example = "Completed")]
    pub status: Option<String>,
}

/// Create appointment routes
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/:id", patch(update_appointment_status).delete(delete_appointment))
}

/// Appointment lookups selected by `type`
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery, PageParams),
    responses(
        (status = 200, description = "Query result, or bare rows for `by-owner`"),
        (status = 400, description = "Invalid type parameter")
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AppointmentQuery>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> AppResult<Response> {
    let response = match query.kind.as_deref().unwrap_or("view") {
        "view" => {
            let select = Query::new()
                .select("*")
                .count_exact()
                .order("ticket_num", Order::Asc)
                .search(&["ticket_num"], query.search.as_deref());
            let result = state
                .tables
                .select(Table::ViewCompleteAppointmentDetails, page.apply(select))
                .await?;
            Json(result).into_response()
        }
        "records" => {
            let mut select = Query::new().select("*");
            if let Some(sched) = query.vaccine_sched_id {
                select = select.eq("vaccine_sched_id", sched);
            }
            select = select.eq_opt("time", query.time.as_deref());
            Json(state.tables.select(Table::AppointmentRecords, select).await?).into_response()
        }
        "by-owner" => {
            let owner_id = required(query.owner_id, "ownerId")?;
            let result = state
                .tables
                .select(
                    Table::ViewCompleteAppointmentDetails,
                    Query::new().select("*").eq("owner_id", owner_id),
                )
                .await?;
            Json(result.data).into_response()
        }
        "check" => {
            let existing = state
                .checks
                .existing_appointments(
                    required(query.owner_id, "owner_id")?,
                    required(query.pet_id, "pet_id")?,
                    required(query.vaccine_sched_id, "vaccine_sched_id")?,
                )
                .await?;
            Json(existing).into_response()
        }
        _ => return Err(AppError::bad_request("Invalid type parameter")),
    };
    Ok(response)
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Inserted", body = QueryResult))
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<QueryResult>> {
    let result = state
        .tables
        .insert(Table::AppointmentRecords, body, Query::new())
        .await?;
    Ok(Json(result))
}

/// Change an appointment's status
#[utoipa::path(
    patch,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = AppointmentStatusRequest,
    responses(
        (status = 200, description = "Updated", body = QueryResult),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<AppointmentStatusRequest>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .update(
            Table::AppointmentRecords,
            json!({ "status": payload.status }),
            Query::new().eq("id", id),
        )
        .await?;
    Ok(Json(result))
}

/// Delete an appointment
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .delete(Table::AppointmentRecords, Query::new().eq("id", id))
        .await?;
    Ok(Json(result.data))
}
