//! Public pet owner self-registration.

use axum::{extract::State, response::Json, routing::post, Router};

use super::pet_owner_handler::PetOwnerAccountRequest;
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::ProvisionedAccount;

/// Create self-registration routes (no authentication)
pub fn register_routes() -> Router<AppState> {
    Router::new().route("/", post(register_pet_owner))
}

/// Register a pet owner account
#[utoipa::path(
    post,
    path = "/api/register-pet-owner",
    tag = "Registration",
    request_body = PetOwnerAccountRequest,
    responses(
        (status = 200, description = "Account created", body = ProvisionedAccount),
        (status = 400, description = "Missing credentials or email already registered")
    )
)]
pub async fn register_pet_owner(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PetOwnerAccountRequest>,
) -> AppResult<Json<ProvisionedAccount>> {
    tracing::info!(email = %payload.email, "Self-registration");
    let account = state.account_service.provision(payload.into()).await?;
    Ok(Json(account))
}
