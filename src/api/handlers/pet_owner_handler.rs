//! Pet owner profile handlers.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ApiJson, ApiPath, ApiQuery, ValidatedJson};
use crate::api::middleware::{require_role, require_self_or, CurrentUser};
use crate::api::AppState;
use crate::config::RPC_PET_COUNTS;
use crate::domain::{NewProfile, PetOwnerFields, Table, STAFF};
use crate::errors::AppResult;
use crate::infra::Query;
use crate::services::{parallel, NewAccount, ProvisionedAccount};
use crate::types::{DataEnvelope, PageParams, PetOwnerPage};

const SEARCH_COLUMNS: &[&str] = &["first_name", "last_name", "gender", "barangay"];
const NAME_COLUMNS: &[&str] = &["first_name", "last_name"];

/// New pet owner account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PetOwnerAccountRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "owner@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    #[validate(nested)]
    pub profile: PetOwnerFields,
}

impl From<PetOwnerAccountRequest> for NewAccount {
    fn from(req: PetOwnerAccountRequest) -> Self {
        NewAccount {
            email: req.email,
            password: req.password,
            profile: NewProfile::PetOwner(req.profile),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPetOwnersQuery {
    /// Matches first name, last name, gender or barangay
    pub search: Option<String>,
    /// Exact barangay
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterPetOwnersQuery {
    /// Exact registration date
    pub date: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    /// Matches first or last name
    pub name: Option<String>,
}

/// Create pet owner routes
pub fn pet_owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pet_owners).post(create_pet_owner))
        .route("/search", get(search_pet_owners))
        .route("/filter", get(filter_pet_owners))
        .route(
            "/:id",
            get(get_pet_owner)
                .patch(update_pet_owner)
                .delete(delete_pet_owner),
        )
}

async fn page_with_pet_counts(state: &AppState, query: Query) -> AppResult<PetOwnerPage> {
    let (page, pet_counts) = parallel::join2(
        state.tables.select(Table::PetOwnerProfiles, query),
        state.tables.rpc(RPC_PET_COUNTS, json!({})),
    )
    .await?;
    Ok(PetOwnerPage::new(page, pet_counts))
}

/// List pet owners
#[utoipa::path(
    get,
    path = "/api/pet-owners",
    tag = "Pet Owners",
    security(("bearer_auth" = [])),
    params(ListPetOwnersQuery, PageParams),
    responses((status = 200, description = "Page of pet owners", body = PetOwnerPage))
)]
pub async fn list_pet_owners(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPetOwnersQuery>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> AppResult<Json<PetOwnerPage>> {
    let select = page.apply(
        Query::new()
            .select("*")
            .search(SEARCH_COLUMNS, query.search.as_deref())
            .eq_opt("barangay", query.location.as_deref())
            .count_exact(),
    );
    Ok(Json(page_with_pet_counts(&state, select).await?))
}

/// Filter pet owners by registration date and barangay
#[utoipa::path(
    get,
    path = "/api/pet-owners/filter",
    tag = "Pet Owners",
    security(("bearer_auth" = [])),
    params(FilterPetOwnersQuery, PageParams),
    responses((status = 200, description = "Page of pet owners", body = PetOwnerPage))
)]
pub async fn filter_pet_owners(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FilterPetOwnersQuery>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> AppResult<Json<PetOwnerPage>> {
    let select = page.apply(
        Query::new()
            .select("*")
            .eq_opt("date_registered", query.date.as_deref())
            .eq_opt("barangay", query.location.as_deref())
            .count_exact(),
    );
    Ok(Json(page_with_pet_counts(&state, select).await?))
}

/// Search pet owners by name
#[utoipa::path(
    get,
    path = "/api/pet-owners/search",
    tag = "Pet Owners",
    security(("bearer_auth" = [])),
    params(NameQuery),
    responses((status = 200, description = "Matching pet owners"))
)]
pub async fn search_pet_owners(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> AppResult<Json<Value>> {
    let result = state
        .tables
        .select(
            Table::PetOwnerProfiles,
            Query::new()
                .select("*")
                .search(NAME_COLUMNS, query.name.as_deref()),
        )
        .await?;
    Ok(Json(result.data))
}

/// Provision a pet owner account
#[utoipa::path(
    post,
    path = "/api/pet-owners",
    tag = "Pet Owners",
    security(("bearer_auth" = [])),
    request_body = PetOwnerAccountRequest,
    responses(
        (status = 200, description = "Account created", body = ProvisionedAccount),
        (status = 400, description = "Invalid request or email already registered"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_pet_owner(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<PetOwnerAccountRequest>,
) -> AppResult<Json<ProvisionedAccount>> {
    require_role(&current_user, STAFF)?;
    let account = state.account_service.provision(payload.into()).await?;
    Ok(Json(account))
}

/// Name of a pet owner
#[utoipa::path(
    get,
    path = "/api/pet-owners/{id}",
    tag = "Pet Owners",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pet owner id")),
    responses((status = 200, description = "First and last name rows"))
)]
pub async fn get_pet_owner(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Value>> {
    let result = state
        .tables
        .select(
            Table::PetOwnerProfiles,
            Query::new().select("first_name, last_name").eq("id", id),
        )
        .await?;
    Ok(Json(result.data))
}

/// Update pet owner profile columns
#[utoipa::path(
    patch,
    path = "/api/pet-owners/{id}",
    tag = "Pet Owners",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pet owner id")),
    responses(
        (status = 200, description = "Updated", body = DataEnvelope),
        (status = 403, description = "Staff or the owner only")
    )
)]
pub async fn update_pet_owner(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(mut patch): ApiJson<Value>,
) -> AppResult<Json<DataEnvelope>> {
    require_self_or(&current_user, id, STAFF)?;
    if let Some(fields) = patch.as_object_mut() {
        fields.remove("id");
    }

    let result = state
        .tables
        .update(Table::PetOwnerProfiles, patch, Query::new().eq("id", id))
        .await?;
    Ok(Json(DataEnvelope::ok(result.data)))
}

/// Delete a pet owner profile row
///
/// The identity user is left behind for the orphan sweep.
#[utoipa::path(
    delete,
    path = "/api/pet-owners/{id}",
    tag = "Pet Owners",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pet owner id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_pet_owner(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Value>> {
    require_role(&current_user, STAFF)?;
    let result = state
        .tables
        .delete(Table::PetOwnerProfiles, Query::new().eq("id", id))
        .await?;
    tracing::info!(owner_id = %id, "Pet owner profile deleted");
    Ok(Json(result.data))
}
