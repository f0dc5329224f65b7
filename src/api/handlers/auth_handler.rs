//! Authentication handlers: register, login, logout.

use axum::{extract::State, routing::post, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::rules::validate_password_strength;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::services::{AuthPayload, RegisterUser, RevokedToken};
use crate::types::Envelope;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(required, length(max = 255))]
    #[schema(example = "Budi Santoso")]
    pub name: Option<String>,
    #[validate(required, length(max = 255))]
    #[schema(example = "budi")]
    pub username: Option<String>,
    #[validate(required, email, length(max = 255))]
    #[schema(example = "budi@example.com")]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    #[schema(example = "081234567890")]
    pub phone: Option<String>,
    /// At least 8 characters
    #[validate(required, custom(function = "validate_password_strength"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: Option<String>,
}

impl RegisterRequest {
    fn into_input(self) -> AppResult<RegisterUser> {
        match (self.name, self.username, self.email, self.password) {
            (Some(name), Some(username), Some(email), Some(password)) => Ok(RegisterUser {
                name,
                username,
                email,
                phone: self.phone,
                password,
            }),
            _ => Err(AppError::bad_request("Incomplete registration payload")),
        }
    }
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(required, email)]
    #[schema(example = "budi@example.com")]
    pub email: Option<String>,
    #[validate(required)]
    #[schema(example = "SecurePass123!")]
    pub password: Option<String>,
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes that act on the caller's current token
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}

/// Register a new user and sign them in
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User Registered", body = AuthPayload),
        (status = 500, description = "Invalid input, including a taken email or username (legacy status policy)"),
        (status = 422, description = "Invalid input, including a taken email or username (standard status policy)")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<RegisterRequest>, AppError>,
) -> AppResult<Envelope<AuthPayload>> {
    let ValidatedJson(payload) = payload.map_err(AppError::into_account_rejection)?;

    let payload = state
        .user_service
        .register(payload.into_input()?)
        .await
        .map_err(AppError::into_account_rejection)?;

    Ok(Envelope::success(payload, "User Registered"))
}

/// Login and get a bearer token
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthPayload),
        (status = 500, description = "Authentication Failed (legacy status policy)"),
        (status = 401, description = "Authentication Failed (standard status policy)"),
        (status = 422, description = "Invalid input (standard status policy)")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<LoginRequest>, AppError>,
) -> AppResult<Envelope<AuthPayload>> {
    let ValidatedJson(payload) = payload.map_err(AppError::into_account_rejection)?;
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::InvalidCredentials);
    };

    let payload = state.user_service.login(email, password).await?;

    Ok(Envelope::success(payload, "Authenticated"))
}

/// Revoke the token used for this request
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Token Revoked", body = RevokedToken),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Envelope<RevokedToken>> {
    let revoked = state.user_service.logout(&current_user).await?;

    Ok(Envelope::success(revoked, "Token Revoked"))
}
