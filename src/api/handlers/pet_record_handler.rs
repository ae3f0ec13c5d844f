//! Pet record handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch},
    Extension, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;
use uuid::Uuid;

use super::required;
use crate::api::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::config::RANGE_NOT_SATISFIABLE_CODE;
use crate::domain::{Table, STAFF};
use crate::errors::AppResult;
use crate::infra::{Order, Query, QueryResult};
use crate::services::statistics;
use crate::types::PageParams;

const SEARCH_COLUMNS: &[&str] = &["pet_name", "specie", "sex", "breed"];

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PetRecordQuery {
    pub search: Option<String>,
    /// `uved` (not vaccinated) or `ved` (vaccinated)
    pub status_filter: Option<String>,
    pub year_filter: Option<i32>,
    /// Month `MM` of the current year
    pub month_filter: Option<String>,
    /// Owner barangay
    pub location_filter: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ForVaccinationQuery {
    pub vaccine_sched_id: Option<i64>,
}

/// Create pet record routes
pub fn pet_record_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pet_records).post(create_pet_record))
        .route("/by-owner/:owner_id", get(pets_by_owner))
        .route("/for-vaccination", get(pets_for_vaccination))
        .route("/:id", patch(update_pet_record).delete(delete_pet_record))
}

fn filtered(query: &PetRecordQuery, year: i32) -> AppResult<Query> {
    let mut select = Query::new()
        .select("*")
        .count_exact()
        .order("pet_name", Order::Asc)
        .search(SEARCH_COLUMNS, query.search.as_deref());

    match query.status_filter.as_deref() {
        Some("uved") => select = select.is_null("date_vaccinated"),
        Some("ved") => select = select.not_null("date_vaccinated"),
        _ => {}
    }
    if let Some(month) = query.month_filter.as_deref().filter(|m| !m.trim().is_empty()) {
        let window = statistics::month_of_year_window(year, month)?;
        select = select
            .gte("date_vaccinated", &window.start)
            .lt("date_vaccinated", &window.end);
    }
    if let Some(year) = query.year_filter {
        select = select
            .gte("date_vaccinated", format!("{}-01-01", year))
            .lte("date_vaccinated", format!("{}-12-31", year));
    }
    Ok(select.eq_opt("owner_barangay", query.location_filter.as_deref()))
}

/// Pets with their owners
#[utoipa::path(
    get,
    path = "/api/pet-records",
    tag = "Pet Records",
    security(("bearer_auth" = [])),
    params(PetRecordQuery, PageParams),
    responses((status = 200, description = "Page of pets", body = QueryResult))
)]
pub async fn list_pet_records(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PetRecordQuery>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> AppResult<Json<QueryResult>> {
    let select = page.apply(filtered(&query, Utc::now().year())?);
    match state.tables.select(Table::ViewPetRecordsWithOwners, select).await {
        Ok(result) => Ok(Json(result)),
        // Paging past the last row
        Err(err) if err.upstream_code() == Some(RANGE_NOT_SATISFIABLE_CODE) => {
            Ok(Json(QueryResult::new(json!([]), Some(0), 200)))
        }
        Err(err) => Err(err),
    }
}

/// Add a pet
#[utoipa::path(
    post,
    path = "/api/pet-records",
    tag = "Pet Records",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inserted", body = QueryResult),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_pet_record(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, STAFF)?;
    let result = state.tables.insert(Table::PetRecords, body, Query::new()).await?;
    Ok(Json(result))
}

/// Update a pet
#[utoipa::path(
    patch,
    path = "/api/pet-records/{id}",
    tag = "Pet Records",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pet id")),
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_pet_record(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .update(Table::PetRecords, patch, Query::new().eq("id", id))
        .await?;
    Ok(Json(result.data))
}

/// Delete a pet
///
/// Callers run the `vaccination-pet` cascade check first.
#[utoipa::path(
    delete,
    path = "/api/pet-records/{id}",
    tag = "Pet Records",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pet id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_pet_record(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .delete(Table::PetRecords, Query::new().eq("id", id))
        .await?;
    tracing::info!(pet_id = id, "Pet record deleted");
    Ok(Json(result.data))
}

/// An owner's pets, oldest first
#[utoipa::path(
    get,
    path = "/api/pet-records/by-owner/{owner_id}",
    tag = "Pet Records",
    security(("bearer_auth" = [])),
    params(("owner_id" = Uuid, Path, description = "Owner id")),
    responses((status = 200, description = "Pets"))
)]
pub async fn pets_by_owner(
    State(state): State<AppState>,
    ApiPath(owner_id): ApiPath<Uuid>,
) -> AppResult<Json<Value>> {
    let result = state
        .tables
        .select(
            Table::PetRecords,
            Query::new()
                .select("*")
                .eq("owner_id", owner_id)
                .order("birth_date", Order::Asc),
        )
        .await?;
    Ok(Json(result.data))
}

/// Unvaccinated pets booked on a schedule
#[utoipa::path(
    get,
    path = "/api/pet-records/for-vaccination",
    tag = "Pet Records",
    security(("bearer_auth" = [])),
    params(ForVaccinationQuery),
    responses(
        (status = 200, description = "Pets", body = QueryResult),
        (status = 403, description = "Staff only")
    )
)]
pub async fn pets_for_vaccination(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<ForVaccinationQuery>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, STAFF)?;
    let select = Query::new()
        .select("*")
        .eq("vaccine_sched_id", required(query.vaccine_sched_id, "vaccineSchedId")?)
        .eq("status", "uved");
    let result = state
        .tables
        .select(Table::ViewPetRecordsForVaccination, select)
        .await?;
    Ok(Json(result))
}
