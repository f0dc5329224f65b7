//! Integration tests for API endpoints.
//!
//! These tests drive the full router with fake services; the only database
//! is an empty in-memory SQLite connection backing `/health`. Error
//! statuses follow the default (legacy) status policy.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use serde_json::{json, Value};
use tower::ServiceExt;

use pemmob_api::api::{create_router, AppState};
use pemmob_api::domain::{Category, CategoryFilter, User, UserRole};
use pemmob_api::errors::{AppError, AppResult};
use pemmob_api::infra::Database;
use pemmob_api::services::{
    AuthService, CurrentUser, MockCategoryService, MockTransactionService, MockUserService,
    RevokedToken, Services, TokenResponse, CATEGORY_NOT_FOUND,
};
use pemmob_api::types::Paginated;

const VALID_TOKEN: &str = "valid-test-token";

fn test_user() -> User {
    User {
        id: 7,
        name: "Test User".to_string(),
        username: "tester".to_string(),
        email: "test@example.com".to_string(),
        phone: Some("0812".to_string()),
        password_hash: "hashed".to_string(),
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_category(id: i32, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        parent_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        parent: None,
        products: None,
    }
}

// =============================================================================
// Fake auth service
// =============================================================================

/// Accepts exactly one token and rejects every credential check
struct FakeAuthService;

#[async_trait]
impl AuthService for FakeAuthService {
    async fn attempt(&self, _email: &str, _password: &str) -> AppResult<User> {
        Err(AppError::InvalidCredentials)
    }

    async fn issue_token(&self, _user: &User) -> AppResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: "mock-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
        })
    }

    async fn authenticate(&self, token: &str) -> AppResult<CurrentUser> {
        if token == VALID_TOKEN {
            Ok(CurrentUser {
                user: test_user(),
                token_id: "token-1".to_string(),
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }

    async fn revoke(&self, token_id: &str) -> AppResult<RevokedToken> {
        Ok(RevokedToken {
            token_id: token_id.to_string(),
            revoked: true,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

struct TestApp {
    users: MockUserService,
    categories: MockCategoryService,
    transactions: MockTransactionService,
}

impl TestApp {
    fn new() -> Self {
        Self {
            users: MockUserService::new(),
            categories: MockCategoryService::new(),
            transactions: MockTransactionService::new(),
        }
    }

    async fn router(self) -> Router {
        let connection = memory_connection().await;
        self.router_on(connection)
    }

    fn router_on(self, connection: DatabaseConnection) -> Router {
        let services = Services::new(
            Arc::new(FakeAuthService),
            Arc::new(self.users),
            Arc::new(self.categories),
            Arc::new(self.transactions),
        );

        let database = Arc::new(Database::from_connection(connection));

        create_router(AppState::from_container(&services, database))
    }
}

async fn memory_connection() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    SeaDatabase::connect(options).await.unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_category_by_id_returns_envelope() {
    let mut app = TestApp::new();
    app.categories
        .expect_get()
        .withf(|id| *id == 3)
        .returning(|id| Ok(test_category(id, "Sport")));

    let (status, body) = send(app.router().await, get("/api/categories?id=3", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["code"], 200);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["meta"]["message"], "Category data retrieved");
    assert_eq!(body["data"]["name"], "Sport");
}

#[tokio::test]
async fn test_missing_category_uses_legacy_not_found_code() {
    let mut app = TestApp::new();
    app.categories
        .expect_get()
        .returning(|_| Err(AppError::not_found(CATEGORY_NOT_FOUND)));

    let (status, body) = send(app.router().await, get("/api/categories?id=99", None)).await;

    assert_eq!(status.as_u16(), 484);
    assert_eq!(body["meta"]["code"], 484);
    assert_eq!(body["meta"]["status"], "error");
    assert_eq!(body["meta"]["message"], "Category data does not exist");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_category_list_passes_filter_and_default_page_size() {
    let mut app = TestApp::new();
    app.categories
        .expect_list()
        .withf(|filter, page| {
            *filter
                == CategoryFilter {
                    name: Some("elect".to_string()),
                    with_products: true,
                }
                && page.page == 1
                && page.per_page == 15
        })
        .returning(|_, page| {
            Ok(Paginated::new(vec![test_category(1, "Electronics")], page, 1))
        });

    let (status, body) = send(
        app.router().await,
        get("/api/categories?name=elect&show_product=yes", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["message"], "Category list retrieved");
    assert_eq!(body["data"]["current_page"], 1);
    assert_eq!(body["data"]["last_page"], 1);
    assert_eq!(body["data"]["data"][0]["name"], "Electronics");
}

#[tokio::test]
async fn test_category_limit_is_capped() {
    let mut app = TestApp::new();
    app.categories
        .expect_list()
        .withf(|filter, page| !filter.with_products && page.per_page == 100 && page.page == 2)
        .returning(|_, page| Ok(Paginated::new(vec![], page, 0)));

    let (status, _) = send(app.router().await, get("/api/categories?limit=500&page=2", None)).await;

    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Transactions
// =============================================================================

#[tokio::test]
async fn test_checkout_requires_token() {
    let mut app = TestApp::new();
    app.transactions.expect_checkout().times(0);

    let (status, body) = send(
        app.router().await,
        post_json("/api/checkout", None, json!({ "items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["meta"]["code"], 401);
    assert_eq!(body["meta"]["message"], "Unauthenticated.");
}

#[tokio::test]
async fn test_checkout_rejects_unknown_token() {
    let app = TestApp::new();

    let (status, _) = send(
        app.router().await,
        post_json("/api/checkout", Some("revoked-token"), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_checkout_with_invalid_status_is_rejected_before_service() {
    let mut app = TestApp::new();
    app.transactions.expect_checkout().times(0);

    let (status, body) = send(
        app.router().await,
        post_json(
            "/api/checkout",
            Some(VALID_TOKEN),
            json!({
                "items": [{ "id": 1, "quantity": 2 }],
                "total_price": 100,
                "shipping_price": 10,
                "status": "DELIVERED"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["meta"]["code"], 422);
    assert_eq!(body["meta"]["message"], "The given data was invalid.");
    assert_eq!(
        body["data"]["errors"]["status"][0],
        "The selected status is invalid."
    );
}

#[tokio::test]
async fn test_checkout_with_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/checkout")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", VALID_TOKEN))
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app.router().await, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["meta"]["status"], "error");
}

#[tokio::test]
async fn test_transaction_list_rejects_unknown_status_filter() {
    let mut app = TestApp::new();
    app.transactions.expect_list().times(0);

    let (status, body) = send(
        app.router().await,
        get("/api/transactions?status=LOST", Some(VALID_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["data"]["errors"]["status"].is_array());
}

#[tokio::test]
async fn test_transaction_list_scopes_to_caller() {
    let mut app = TestApp::new();
    app.transactions
        .expect_list()
        .withf(|current, filter, page| {
            current.id() == 7 && filter.status.is_none() && page.per_page == 6
        })
        .returning(|_, _, page| Ok(Paginated::new(vec![], page, 0)));

    let (status, body) = send(app.router().await, get("/api/transactions", Some(VALID_TOKEN))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["message"], "Transaction list retrieved");
    assert_eq!(body["data"]["total"], 0);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_fetch_profile() {
    let mut app = TestApp::new();
    app.users
        .expect_fetch()
        .returning(|current| Ok(current.user.clone()));

    let (status, body) = send(app.router().await, get("/api/user", Some(VALID_TOKEN))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["message"], "Profile data retrieved");
    assert_eq!(body["data"]["username"], "tester");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_failure_envelope() {
    let mut app = TestApp::new();
    app.users
        .expect_login()
        .returning(|_, _| Err(AppError::InvalidCredentials));

    let (status, body) = send(
        app.router().await,
        post_json(
            "/api/login",
            None,
            json!({ "email": "test@example.com", "password": "wrong-password" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["meta"]["message"], "Authentication Failed");
    assert_eq!(body["data"]["message"], "Unauthorized");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let mut app = TestApp::new();
    app.users.expect_register().times(0);

    let (status, body) = send(
        app.router().await,
        post_json(
            "/api/register",
            None,
            json!({ "name": "Budi", "email": "not-an-email", "password": "short" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["meta"]["message"], "Authentication Failed");
    let errors = &body["data"]["errors"];
    assert!(errors["username"].is_array());
    assert!(errors["email"].is_array());
    assert!(errors["password"].is_array());
    assert!(errors.get("name").is_none());
}

#[tokio::test]
async fn test_register_with_taken_email_uses_legacy_failure() {
    let mut app = TestApp::new();
    app.users
        .expect_register()
        .returning(|_| Err(AppError::validation("email", "The email has already been taken.")));

    let (status, body) = send(
        app.router().await,
        post_json(
            "/api/register",
            None,
            json!({
                "name": "Budi",
                "username": "budi",
                "email": "budi@example.com",
                "password": "SecurePass123!"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["meta"]["code"], 500);
    assert_eq!(body["meta"]["message"], "Authentication Failed");
    assert_eq!(
        body["data"]["errors"]["email"][0],
        "The email has already been taken."
    );
}

#[tokio::test]
async fn test_login_without_password_uses_legacy_failure() {
    let mut app = TestApp::new();
    app.users.expect_login().times(0);

    let (status, body) = send(
        app.router().await,
        post_json("/api/login", None, json!({ "email": "test@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["data"]["errors"]["password"].is_array());
}

#[tokio::test]
async fn test_update_profile_rejects_long_phone() {
    let mut app = TestApp::new();
    app.users.expect_update_profile().times(0);

    let (status, body) = send(
        app.router().await,
        post_json(
            "/api/user",
            Some(VALID_TOKEN),
            json!({ "phone": "0812345678901234567" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["data"]["errors"]["phone"].is_array());
}

#[tokio::test]
async fn test_logout_revokes_current_token() {
    let mut app = TestApp::new();
    app.users.expect_logout().returning(|current| {
        Ok(RevokedToken {
            token_id: current.token_id.clone(),
            revoked: true,
        })
    });

    let (status, body) = send(
        app.router().await,
        post_json("/api/logout", Some(VALID_TOKEN), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["message"], "Token Revoked");
    assert_eq!(body["data"]["token_id"], "token-1");
    assert_eq!(body["data"]["revoked"], true);
}

// =============================================================================
// Operational endpoints
// =============================================================================

#[tokio::test]
async fn test_health_reports_database() {
    let app = TestApp::new();

    let (status, body) = send(app.router().await, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
    assert!(body["services"]["database"].get("error").is_none());
}

#[tokio::test]
async fn test_health_hides_database_error() {
    let connection = memory_connection().await;
    connection.clone().close().await.unwrap();

    let (status, body) = send(TestApp::new().router_on(connection), get("/health", None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"], json!({ "status": "unhealthy" }));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let (status, body) = send(app.router().await, get("/api-docs/openapi.json", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/checkout"].is_object());
}
