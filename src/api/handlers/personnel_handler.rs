//! Personnel account handlers (admin only).

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ApiJson, ApiPath, ApiQuery, ValidatedJson};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{NewProfile, PersonnelFields, Table, ADMIN_ONLY};
use crate::errors::AppResult;
use crate::infra::{Order, Query, QueryResult};
use crate::services::{NewAccount, ProvisionedAccount};
use crate::types::PageParams;

const SEARCH_COLUMNS: &[&str] = &["email", "last_name", "first_name", "address"];

/// New personnel account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PersonnelAccountRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "staff@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(nested)]
    pub profile: PersonnelFields,
}

impl From<PersonnelAccountRequest> for NewAccount {
    fn from(req: PersonnelAccountRequest) -> Self {
        NewAccount {
            email: req.email,
            password: req.password,
            profile: NewProfile::Personnel(req.profile),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPersonnelQuery {
    /// Matches email, names or address
    pub search: Option<String>,
}

/// Create personnel routes
pub fn personnel_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_personnel).post(create_personnel))
        .route("/:id", patch(update_personnel).delete(delete_personnel))
}

/// List personnel
#[utoipa::path(
    get,
    path = "/api/personnel",
    tag = "Personnel",
    security(("bearer_auth" = [])),
    params(ListPersonnelQuery, PageParams),
    responses(
        (status = 200, description = "Page of personnel", body = QueryResult),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_personnel(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<ListPersonnelQuery>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> AppResult<Json<QueryResult>> {
    require_role(&current_user, ADMIN_ONLY)?;

    let select = page.apply(
        Query::new()
            .select("*")
            .search(SEARCH_COLUMNS, query.search.as_deref())
            .order("last_name", Order::Desc)
            .order("first_name", Order::Desc)
            .count_exact(),
    );
    let result = state.tables.select(Table::PersonnelProfiles, select).await?;
    Ok(Json(result))
}

/// Provision a personnel account
#[utoipa::path(
    post,
    path = "/api/personnel",
    tag = "Personnel",
    security(("bearer_auth" = [])),
    request_body = PersonnelAccountRequest,
    responses(
        (status = 200, description = "Account created", body = ProvisionedAccount),
        (status = 400, description = "Invalid request or email already registered"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_personnel(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<PersonnelAccountRequest>,
) -> AppResult<Json<ProvisionedAccount>> {
    require_role(&current_user, ADMIN_ONLY)?;
    let account = state.account_service.provision(payload.into()).await?;
    Ok(Json(account))
}

/// Update a personnel account
///
/// `email` and `password` go to the identity store first; the remaining
/// columns update the profile row.
#[utoipa::path(
    patch,
    path = "/api/personnel/{id}",
    tag = "Personnel",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Personnel id")),
    responses(
        (status = 200, description = "Updated profile rows"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn update_personnel(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, ADMIN_ONLY)?;
    let data = state.account_service.update_personnel(id, fields).await?;
    Ok(Json(data))
}

/// Delete a personnel account's identity user
#[utoipa::path(
    delete,
    path = "/api/personnel/{id}",
    tag = "Personnel",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Personnel id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn delete_personnel(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, ADMIN_ONLY)?;
    state.account_service.delete_account(id).await?;
    Ok(Json(json!({})))
}
