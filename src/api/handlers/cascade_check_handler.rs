//! Pre-delete dependency lookups.

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::api::extractors::ApiQuery;
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::STAFF;
use crate::errors::AppResult;
use crate::services::CascadeCheck;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CascadeCheckQuery {
    /// `vaccination-pet`, `distributed-inventory` or `vaccine-inventory`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub pet_id: Option<i64>,
    pub inventory_id: Option<i64>,
}

/// Create cascade check routes
pub fn cascade_check_routes() -> Router<AppState> {
    Router::new().route("/", get(run_cascade_check))
}

/// Rows that depend on the target; empty means it is safe to delete
#[utoipa::path(
    get,
    path = "/api/cascade-checks",
    tag = "Cascade Checks",
    security(("bearer_auth" = [])),
    params(CascadeCheckQuery),
    responses(
        (status = 200, description = "Dependent rows"),
        (status = 400, description = "Invalid type or missing id"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn run_cascade_check(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<CascadeCheckQuery>,
) -> AppResult<Json<Vec<Value>>> {
    require_role(&current_user, STAFF)?;
    let check = CascadeCheck::parse(
        query.kind.as_deref().unwrap_or_default(),
        query.pet_id,
        query.inventory_id,
    )?;
    Ok(Json(state.checks.run(check).await?))
}
