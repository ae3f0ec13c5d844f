//! Vaccination record handlers, including the dashboard aggregations.

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;
use uuid::Uuid;

use super::required;
use crate::api::extractors::{ApiJson, ApiQuery};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Table, STAFF};
use crate::errors::{AppError, AppResult};
use crate::infra::{Order, Query, QueryResult};
use crate::services::statistics::{self, DateWindow, VaccinationStats};
use crate::types::PageParams;

const STATS_SELECT: &str = "created_at, vax_sched_id, \
    VaccinationSchedule!inner (id, start_date, start_time, end_time, location), \
    VaccineInventory!inner (id, name, stockin_date, status), \
    PetRecords!inner (id, pet_name, specie, status, \
    PetOwnerProfiles!inner (id, first_name, last_name, barangay))";

const BARANGAY_TOTALS_SELECT: &str = "PetRecords!inner (PetOwnerProfiles!inner (barangay))";

const DETAILS_SEARCH_COLUMNS: &[&str] = &["location", "vaccine_name", "pet_owner", "pet_name"];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VaccinationRecordQuery {
    /// `stats`, `by-barangay-totals`, `all-count`, `each-barangay`,
    /// `each-barangay-details`, `by-owner` or `details`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Schedule location filter (`stats`)
    pub barangay: Option<String>,
    /// Month as `YYYY-MM` (`each-barangay*`); current year when absent
    pub date: Option<String>,
    #[serde(rename = "ownerId")]
    pub owner_id: Option<Uuid>,
    pub search: Option<String>,
}

/// Create vaccination record routes
pub fn vaccination_record_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_vaccination_records).post(create_vaccination_record),
    )
}

fn within(query: Query, column: &str, window: &DateWindow) -> Query {
    query.gte(column, &window.start).lt(column, &window.end)
}

fn month_or_year(date: Option<&str>, year: i32) -> AppResult<DateWindow> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => statistics::month_window(date),
        None => Ok(statistics::year_window(year)),
    }
}

/// Vaccination record lookups selected by `type`
#[utoipa::path(
    get,
    path = "/api/vaccination-records",
    tag = "Vaccination Records",
    security(("bearer_auth" = [])),
    params(VaccinationRecordQuery, PageParams),
    responses(
        (status = 200, description = "Rows, query result or aggregate, depending on `type`"),
        (status = 400, description = "Invalid type parameter")
    )
)]
pub async fn get_vaccination_records(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VaccinationRecordQuery>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> AppResult<Response> {
    let year = Utc::now().year();

    let response = match query.kind.as_deref().unwrap_or("all") {
        "stats" => {
            let select = Query::new()
                .select(STATS_SELECT)
                .eq_opt("VaccinationSchedule.location", query.barangay.as_deref());
            let rows = state
                .tables
                .select(Table::VaccinationRecords, select)
                .await?
                .into_rows();
            let stats: VaccinationStats = statistics::vaccination_stats(&rows, year);
            Json(stats).into_response()
        }
        "by-barangay-totals" => {
            let rows = state
                .tables
                .select(
                    Table::VaccinationRecords,
                    Query::new().select(BARANGAY_TOTALS_SELECT),
                )
                .await?
                .into_rows();
            Json(statistics::barangay_totals(&rows)).into_response()
        }
        "all-count" => {
            let result = state
                .tables
                .select(
                    Table::VaccinationRecords,
                    Query::new().select("*").count_exact(),
                )
                .await?;
            Json(result).into_response()
        }
        "each-barangay" => {
            let window = month_or_year(query.date.as_deref(), year)?;
            let select = Query::new()
                .select("*")
                .order("vax_sched_date", Order::Desc);
            let result = state
                .tables
                .select(
                    Table::ViewVaccinationRecordsEachBarangay,
                    within(select, "vax_sched_date", &window),
                )
                .await?;
            Json(result.data).into_response()
        }
        "each-barangay-details" => {
            let window = month_or_year(query.date.as_deref(), year)?;
            let select = Query::new()
                .select("*")
                .order("vax_sched_date", Order::Desc)
                .order("location", Order::Asc)
                .order("pet_name", Order::Asc);
            let result = state
                .tables
                .select(
                    Table::ViewCompleteVaccinationDetails,
                    within(select, "vax_sched_date", &window),
                )
                .await?;
            Json(result.data).into_response()
        }
        "by-owner" => {
            let owner_id = required(query.owner_id, "ownerId")?;
            let result = state
                .tables
                .select(
                    Table::ViewCompleteVaccinationDetails,
                    Query::new()
                        .select("*")
                        .eq("owner_id", owner_id)
                        .order("created_at", Order::Desc),
                )
                .await?;
            Json(result.data).into_response()
        }
        "details" => {
            let select = Query::new()
                .select("*")
                .order("created_at", Order::Desc)
                .search(DETAILS_SEARCH_COLUMNS, query.search.as_deref());
            let result = state
                .tables
                .select(Table::ViewCompleteVaccinationDetails, page.apply(select))
                .await?;
            Json(result).into_response()
        }
        _ => return Err(AppError::bad_request("Invalid type parameter")),
    };
    Ok(response)
}

/// Record a vaccination
#[utoipa::path(
    post,
    path = "/api/vaccination-records",
    tag = "Vaccination Records",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inserted rows", body = QueryResult),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_vaccination_record(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .insert(Table::VaccinationRecords, body, Query::new().returning())
        .await?;
    Ok(Json(result))
}
