//! Distributed vaccine handlers (staff only).

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use super::required;
use crate::api::extractors::{ApiJson, ApiQuery};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Table, STAFF};
use crate::errors::{AppError, AppResult};
use crate::infra::{Query, QueryResult};
use crate::services::statistics;
use crate::types::DistributedPage;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DistributedQuery {
    /// `check` looks up an existing distribution; anything else lists
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub barangay: Option<String>,
    pub date: Option<String>,
    pub inventory_id: Option<i64>,
}

/// Bulk update of distribution rows, selected by `type`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributedUpdateRequest {
    /// `by-inventory`, `by-date-barangay` or `by-inventory-id`
    #[serde(rename = "type")]
    pub kind: String,
    /// Inventory id for `by-inventory`
    pub id: Option<i64>,
    pub barangay: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "inventory_id")]
    pub inventory_id: Option<i64>,
    #[schema(value_type = Object)]
    pub update_data: Value,
}

impl DistributedUpdateRequest {
    fn filter(&self) -> AppResult<Query> {
        let query = match self.kind.as_str() {
            "by-inventory" => Query::new().eq("inventory_id", required(self.id, "id")?),
            "by-date-barangay" => Query::new()
                .eq("barangay", required(self.barangay.as_deref(), "barangay")?)
                .eq("date", required(self.date.as_deref(), "date")?)
                .eq("inventory_id", required(self.inventory_id, "inventory_id")?),
            "by-inventory-id" => {
                Query::new().eq("inventory_id", required(self.inventory_id, "inventory_id")?)
            }
            _ => return Err(AppError::bad_request("Invalid type")),
        };
        Ok(query)
    }
}

/// Create distributed vaccine routes
pub fn distributed_vaccine_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_distributions)
            .post(create_distribution)
            .patch(update_distributions),
    )
}

/// Distribution lookup or listing
#[utoipa::path(
    get,
    path = "/api/distributed-vaccines",
    tag = "Distributed Vaccines",
    security(("bearer_auth" = [])),
    params(DistributedQuery),
    responses(
        (status = 200, description = "Matching rows for `check`, otherwise the page", body = DistributedPage),
        (status = 403, description = "Staff only")
    )
)]
pub async fn get_distributions(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<DistributedQuery>,
) -> AppResult<Response> {
    require_role(&current_user, STAFF)?;

    if query.kind.as_deref() == Some("check") {
        let select = Query::new()
            .select("id, num_vaccines")
            .eq("barangay", required(query.barangay.as_deref(), "barangay")?)
            .eq("date", required(query.date.as_deref(), "date")?)
            .eq("inventory_id", required(query.inventory_id, "inventory_id")?);
        let result = state.tables.select(Table::DistributedVaccines, select).await?;
        return Ok(Json(result.data).into_response());
    }

    let select = Query::new()
        .select("*")
        .count_exact()
        .eq_opt("barangay", query.barangay.as_deref());
    let result = state.tables.select(Table::DistributedVaccines, select).await?;
    let total_vaccines = statistics::total_vaccines(result.rows());
    Ok(Json(DistributedPage::new(result, total_vaccines)).into_response())
}

/// Record a distribution
#[utoipa::path(
    post,
    path = "/api/distributed-vaccines",
    tag = "Distributed Vaccines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inserted", body = QueryResult),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_distribution(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .insert(Table::DistributedVaccines, body, Query::new())
        .await?;
    Ok(Json(result))
}

/// Update distributions in bulk
#[utoipa::path(
    patch,
    path = "/api/distributed-vaccines",
    tag = "Distributed Vaccines",
    security(("bearer_auth" = [])),
    request_body = DistributedUpdateRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Invalid type"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_distributions(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<DistributedUpdateRequest>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let filter = payload.filter()?;
    let result = state
        .tables
        .update(Table::DistributedVaccines, payload.update_data, filter)
        .await?;
    Ok(Json(result.data))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(body: Value) -> DistributedUpdateRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_filter_by_inventory_uses_id() {
        let req = request(json!({ "type": "by-inventory", "id": 3, "updateData": {} }));
        let filter = req.filter().unwrap();
        assert_eq!(
            filter.filters(),
            &[("inventory_id".to_string(), "eq.3".to_string())]
        );
    }

    #[test]
    fn test_filter_by_date_barangay_needs_all_keys() {
        let req = request(json!({
            "type": "by-date-barangay",
            "barangay": "Poblacion",
            "updateData": {}
        }));
        assert!(matches!(req.filter(), Err(AppError::BadRequest(_))));

        let req = request(json!({
            "type": "by-date-barangay",
            "barangay": "Poblacion",
            "date": "2024-05-01",
            "inventory_id": 9,
            "updateData": { "num_vaccines": 4 }
        }));
        assert_eq!(req.filter().unwrap().filters().len(), 3);
    }

    #[test]
    fn test_filter_rejects_unknown_type() {
        let req = request(json!({ "type": "everything", "updateData": {} }));
        match req.filter() {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid type"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
