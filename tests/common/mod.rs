use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use fleetops::router::init_router;
use fleetops::state::AppState;
use fleetops_config::{CorsConfig, JwtConfig};
use fleetops_core::tiers::default_rules;
use fleetops_core::{RightCatalog, hash_password};
use fleetops_db::{PermissionStore, PgPermissionStore, run_seed};

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

/// Seed the permission tables, then build the full router over `pool`.
pub async fn setup_test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    let catalog = RightCatalog::standard().unwrap();
    let store = PgPermissionStore::new(pool);
    run_seed(&store, &catalog, &default_rules()).await.unwrap();

    let state = AppState::new(
        Arc::new(store),
        catalog,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
    );
    init_router(state, None)
}

/// Create a user who belongs to the named groups.
pub async fn create_test_user(pool: &PgPool, groups: &[&str]) -> TestUser {
    let store = PgPermissionStore::new(pool.clone());
    let email = generate_unique_email();
    let password = "testpass123".to_string();

    let user = store
        .create_user("Test User", &email, &hash_password(&password).unwrap())
        .await
        .unwrap();

    for name in groups {
        let group = store.get_group_by_name(name).await.unwrap();
        store.add_user_group(user.id, group.id).await.unwrap();
    }

    TestUser {
        id: user.id,
        email,
        password,
    }
}

#[allow(dead_code)]
pub async fn group_id(pool: &PgPool, name: &str) -> Uuid {
    PgPermissionStore::new(pool.clone())
        .get_group_by_name(name)
        .await
        .unwrap()
        .id
}

pub async fn get_auth_token(app: Router, user: &TestUser) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": user.password })),
    )
    .await;

    body["access_token"]
        .as_str()
        .unwrap_or_else(|| panic!("No access_token in response. Status: {status}, Body: {body}"))
        .to_string()
}

/// Fire one request at the app and return the status plus the JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "Non-JSON body. Status: {status}, Body: {:?}",
                String::from_utf8_lossy(&bytes)
            )
        })
    };

    (status, body)
}

/// Sorted `code` fields of a JSON array of rights.
#[allow(dead_code)]
pub fn codes(rights: &Value) -> Vec<String> {
    let mut codes: Vec<String> = rights
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["code"].as_str().unwrap().to_string())
        .collect();
    codes.sort();
    codes
}

pub fn generate_unique_email() -> String {
    format!("test-{}@fleet.test", Uuid::new_v4())
}
