//! Vaccine inventory handlers (staff only).

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::api::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Table, STAFF};
use crate::errors::AppResult;
use crate::infra::{Order, Query, QueryResult};
use crate::types::PageParams;

const SEARCH_COLUMNS: &[&str] = &["batch_number", "name", "status"];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    /// `true` returns every batch, unpaginated
    pub all: Option<bool>,
    pub search: Option<String>,
}

/// Create vaccine inventory routes
pub fn vaccine_inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(create_inventory))
        .route("/:id", patch(update_inventory).delete(delete_inventory))
}

/// List inventory batches
#[utoipa::path(
    get,
    path = "/api/vaccine-inventory",
    tag = "Vaccine Inventory",
    security(("bearer_auth" = [])),
    params(InventoryQuery, PageParams),
    responses(
        (status = 200, description = "Inventory rows", body = QueryResult),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<InventoryQuery>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, STAFF)?;

    let select = if query.all.unwrap_or(false) {
        Query::new().select("*")
    } else {
        page.apply(
            Query::new()
                .select("*")
                .order("last_modified", Order::Desc)
                .search(SEARCH_COLUMNS, query.search.as_deref()),
        )
    };
    let result = state.tables.select(Table::VaccineInventory, select).await?;
    Ok(Json(result))
}

/// Add an inventory batch
#[utoipa::path(
    post,
    path = "/api/vaccine-inventory",
    tag = "Vaccine Inventory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inserted rows", body = QueryResult),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .insert(Table::VaccineInventory, body, Query::new().returning())
        .await?;
    Ok(Json(result))
}

/// Update an inventory batch
#[utoipa::path(
    patch,
    path = "/api/vaccine-inventory/{id}",
    tag = "Vaccine Inventory",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Inventory id")),
    responses(
        (status = 200, description = "Updated rows"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .update(
            Table::VaccineInventory,
            patch,
            Query::new().eq("id", id).returning(),
        )
        .await?;
    Ok(Json(result.data))
}

/// Delete an inventory batch
///
/// Callers run the `distributed-inventory` cascade check first.
#[utoipa::path(
    delete,
    path = "/api/vaccine-inventory/{id}",
    tag = "Vaccine Inventory",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Inventory id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_inventory(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .delete(Table::VaccineInventory, Query::new().eq("id", id))
        .await?;
    Ok(Json(result.data))
}
