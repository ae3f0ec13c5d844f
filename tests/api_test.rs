//! Integration tests for API endpoints.
//!
//! The router runs against in-memory identity and table stores, so these
//! exercise authentication, role gating and handler dispatch end to end.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{app, seed_personnel, seed_pet_owner, FakeIdentity, FakeTables};
use petvac_api::config::{ADMIN_DISPLAY_NAME, ALREADY_REGISTERED_MESSAGE};
use petvac_api::domain::Table;

// =============================================================================
// Test Helpers
// =============================================================================

const ADMIN_TOKEN: &str = "admin-token";
const STAFF_TOKEN: &str = "staff-token";
const OWNER_TOKEN: &str = "owner-token";

struct TestApp {
    router: Router,
    identity: std::sync::Arc<FakeIdentity>,
    tables: std::sync::Arc<FakeTables>,
    owner_id: uuid::Uuid,
}

/// One admin, one personnel member and one pet owner, each with a session.
fn test_app() -> TestApp {
    let identity = FakeIdentity::new();
    let tables = FakeTables::new();

    identity.add_session("root@petvac.test", ADMIN_TOKEN);
    let staff_id = identity.add_session("staff@petvac.test", STAFF_TOKEN);
    seed_personnel(&tables, staff_id);
    let owner_id = identity.add_session("owner@petvac.test", OWNER_TOKEN);
    seed_pet_owner(&tables, owner_id, "Poblacion");

    TestApp {
        router: app(&identity, &tables),
        identity,
        tables,
        owner_id,
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(router: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(router, Method::GET, uri, token, None).await
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app();
    let (status, body) = get(&app.router, "/api/pet-owners", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let app = test_app();
    let (status, _) = get(&app.router, "/api/auth/role", Some("forged")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_reports_both_stores() {
    let app = test_app();
    let (status, body) = get(&app.router, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["identity"]["status"], "healthy");
}

// =============================================================================
// Role resolution
// =============================================================================

#[tokio::test]
async fn test_role_without_profile_is_admin() {
    let app = test_app();
    let (status, body) = get(&app.router, "/api/auth/role", Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["user"]["name"], ADMIN_DISPLAY_NAME);
    assert!(body["user"].get("barangay").is_none());
}

#[tokio::test]
async fn test_role_of_pet_owner_carries_barangay() {
    let app = test_app();
    let (status, body) = get(&app.router, "/api/auth/role", Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "pet-owner");
    assert_eq!(body["user"]["id"], app.owner_id.to_string());
    assert_eq!(body["user"]["name"], "Juan Dela Cruz");
    assert_eq!(body["user"]["barangay"], "Poblacion");
}

#[tokio::test]
async fn test_role_of_personnel() {
    let app = test_app();
    let (_, body) = get(&app.router, "/api/auth/role", Some(STAFF_TOKEN)).await;
    assert_eq!(body["role"], "personnel");
    assert_eq!(body["user"]["name"], "Maria Santos");
}

// =============================================================================
// Role gating
// =============================================================================

#[tokio::test]
async fn test_pet_owner_cannot_read_inventory() {
    let app = test_app();
    let (status, body) = get(&app.router, "/api/vaccine-inventory", Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
async fn test_personnel_cannot_manage_personnel() {
    let app = test_app();
    let (status, _) = get(&app.router, "/api/personnel", Some(STAFF_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_pet_owner_cannot_read_other_email() {
    let app = test_app();
    let other = app.identity.add_user("someone@petvac.test");
    let uri = format!("/api/auth/user?userId={}", other);
    let (status, _) = get(&app.router, &uri, Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&app.router, "/api/auth/user", Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "owner@petvac.test");
}

#[tokio::test]
async fn test_staff_can_read_other_email() {
    let app = test_app();
    let uri = format!("/api/auth/user?userId={}", app.owner_id);
    let (status, body) = get(&app.router, &uri, Some(STAFF_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "owner@petvac.test");
}

// =============================================================================
// Dispatch on `type`
// =============================================================================

#[tokio::test]
async fn test_unknown_vaccination_record_type_is_bad_request() {
    let app = test_app();
    let (status, body) = get(
        &app.router,
        "/api/vaccination-records?type=everything",
        Some(STAFF_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid type parameter");
}

#[tokio::test]
async fn test_appointments_by_owner_requires_owner() {
    let app = test_app();
    let (status, body) = get(
        &app.router,
        "/api/appointments?type=by-owner",
        Some(OWNER_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ownerId is required");
}

#[tokio::test]
async fn test_malformed_query_is_bad_request() {
    let app = test_app();
    let (status, body) = get(
        &app.router,
        "/api/pet-records?entriesPerPage=many",
        Some(STAFF_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// =============================================================================
// Cascade checks
// =============================================================================

#[tokio::test]
async fn test_cascade_check_lists_dependent_records() {
    let app = test_app();
    app.tables
        .seed(Table::VaccinationRecords, json!({ "vaccine_id": 1, "pet_id": 7 }));

    let (status, body) = get(
        &app.router,
        "/api/cascade-checks?type=vaccination-pet&pet_id=7",
        Some(STAFF_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (_, body) = get(
        &app.router,
        "/api/cascade-checks?type=vaccination-pet&pet_id=8",
        Some(STAFF_TOKEN),
    )
    .await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_cascade_check_rejects_missing_id_and_bad_type() {
    let app = test_app();
    let (status, body) = get(
        &app.router,
        "/api/cascade-checks?type=distributed-inventory",
        Some(STAFF_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "inventory_id is required");

    let (status, body) = get(&app.router, "/api/cascade-checks?type=pets", Some(STAFF_TOKEN)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid type");
}

// =============================================================================
// CRUD passthrough
// =============================================================================

#[tokio::test]
async fn test_pet_records_by_owner() {
    let app = test_app();
    app.tables.seed(
        Table::PetRecords,
        json!({ "id": 1, "pet_name": "Bantay", "owner_id": app.owner_id.to_string() }),
    );
    app.tables.seed(
        Table::PetRecords,
        json!({ "id": 2, "pet_name": "Muning", "owner_id": uuid::Uuid::new_v4().to_string() }),
    );

    let uri = format!("/api/pet-records/by-owner/{}", app.owner_id);
    let (status, body) = get(&app.router, &uri, Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["pet_name"], "Bantay");
}

#[tokio::test]
async fn test_admin_deletes_all_notifications() {
    let app = test_app();
    app.tables
        .seed(Table::AdminNotifications, json!({ "id": 1, "message": "a" }));
    app.tables
        .seed(Table::AdminNotifications, json!({ "id": 2, "message": "b" }));

    let (status, _) = send(
        &app.router,
        Method::DELETE,
        "/api/notifications",
        Some(STAFF_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app.router,
        Method::DELETE,
        "/api/notifications",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.tables.rows(Table::AdminNotifications).is_empty());
}

#[tokio::test]
async fn test_overview_count_by_barangay() {
    let app = test_app();
    seed_pet_owner(&app.tables, uuid::Uuid::new_v4(), "San Roque");

    let (status, body) = get(&app.router, "/api/overview", Some(STAFF_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(2));

    let (_, body) = get(&app.router, "/api/overview?barangay=San%20Roque", Some(STAFF_TOKEN)).await;
    assert_eq!(body, json!(1));
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_self_registration_then_duplicate() {
    let app = test_app();
    let payload = json!({
        "email": "new.owner@petvac.test",
        "password": "secret123",
        "profile": { "first_name": "Ana", "last_name": "Reyes", "barangay": "Poblacion" }
    });

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/register-pet-owner",
        None,
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = body["userID"].as_str().unwrap().to_string();
    assert_eq!(body["profileData"][0]["id"], user_id);
    assert_eq!(body["profileData"][0]["email"], "new.owner@petvac.test");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/register-pet-owner",
        None,
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], ALREADY_REGISTERED_MESSAGE);
}

#[tokio::test]
async fn test_registration_rejects_bad_email() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/register-pet-owner",
        None,
        Some(json!({ "email": "not-an-email", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
