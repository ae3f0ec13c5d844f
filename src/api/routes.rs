//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, appointment_routes, auth_routes, cascade_check_routes,
    distributed_vaccine_routes, notification_routes, overview_routes, personnel_routes,
    pet_owner_routes, pet_record_routes, register_routes, vaccination_record_routes,
    vaccination_schedule_routes, vaccine_inventory_routes,
};
use super::middleware::auth_middleware;
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Every route here needs a bearer token
    let protected = Router::new()
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
        .nest("/pet-owners", pet_owner_routes())
        .nest("/personnel", personnel_routes())
        .nest("/appointments", appointment_routes())
        .nest("/vaccination-records", vaccination_record_routes())
        .nest("/vaccine-inventory", vaccine_inventory_routes())
        .nest("/vaccination-schedule", vaccination_schedule_routes())
        .nest("/distributed-vaccines", distributed_vaccine_routes())
        .nest("/notifications", notification_routes())
        .nest("/cascade-checks", cascade_check_routes())
        .nest("/pet-records", pet_record_routes())
        .nest("/overview", overview_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        // Self-registration is the only public write
        .nest("/register-pet-owner", register_routes())
        .merge(protected);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Pet vaccination records API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    identity: ServiceStatus,
    database: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<E: ToString> From<Result<(), E>> for ServiceStatus {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => ServiceStatus {
                status: "healthy",
                error: None,
            },
            Err(e) => ServiceStatus {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }
}

/// Health check endpoint probing the identity service and the record store
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (identity, database) = tokio::join!(state.identity.ping(), state.tables.ping());
    let identity = ServiceStatus::from(identity);
    let database = ServiceStatus::from(database);

    let all_healthy = identity.status == "healthy" && database.status == "healthy";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { identity, database },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
