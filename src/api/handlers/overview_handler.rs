//! Dashboard overview counts.

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::extractors::ApiQuery;
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Table, STAFF};
use crate::errors::{AppError, AppResult};
use crate::infra::Query;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverviewQuery {
    /// `count` (default) or `all`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Restricts `count` to one barangay
    pub barangay: Option<String>,
}

/// Create overview routes
pub fn overview_routes() -> Router<AppState> {
    Router::new().route("/", get(get_overview))
}

/// Pet owner count, or every pet owner with the count
#[utoipa::path(
    get,
    path = "/api/overview",
    tag = "Overview",
    security(("bearer_auth" = [])),
    params(OverviewQuery),
    responses(
        (status = 200, description = "Bare count for `count`, query result for `all`"),
        (status = 400, description = "Invalid type"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn get_overview(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<OverviewQuery>,
) -> AppResult<Response> {
    require_role(&current_user, STAFF)?;

    match query.kind.as_deref().unwrap_or("count") {
        "count" => {
            let select = Query::new()
                .select("*")
                .count_exact()
                .eq_opt("barangay", query.barangay.as_deref());
            let result = state.tables.select(Table::PetOwnerProfiles, select).await?;
            Ok(Json(result.count).into_response())
        }
        "all" => {
            let result = state
                .tables
                .select(
                    Table::PetOwnerProfiles,
                    Query::new().select("*").count_exact(),
                )
                .await?;
            Ok(Json(result).into_response())
        }
        _ => Err(AppError::bad_request("Invalid type")),
    }
}
