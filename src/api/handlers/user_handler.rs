//! Profile handlers for the authenticated user.

use axum::{extract::State, routing::get, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::rules::validate_password_strength;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::User;
use crate::errors::AppResult;
use crate::services::ProfileUpdate;
use crate::types::Envelope;

/// Profile update request; omitted fields stay unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 255))]
    #[schema(example = "Budi S.")]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub username: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 15))]
    #[schema(example = "081234567890")]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(request: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            name: request.name,
            username: request.username,
            email: request.email,
            phone: request.phone,
            password: request.password,
        }
    }
}

/// Profile routes (require authentication)
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user", get(fetch).post(update_profile))
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "Users",
    responses(
        (status = 200, description = "Profile data retrieved", body = User),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn fetch(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Envelope<User>> {
    let user = state.user_service.fetch(&current_user).await?;

    Ok(Envelope::success(user, "Profile data retrieved"))
}

/// Update the authenticated user's profile
#[utoipa::path(
    post,
    path = "/api/user",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile Updated Successfully", body = User),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Envelope<User>> {
    let user = state
        .user_service
        .update_profile(&current_user, payload.into())
        .await?;

    Ok(Envelope::success(user, "Profile Updated Successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_longer_than_fifteen_is_rejected() {
        let request = UpdateProfileRequest {
            phone: Some("0812345678901234".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdateProfileRequest::default().validate().is_ok());
    }

    #[test]
    fn test_weak_password_is_rejected() {
        let request = UpdateProfileRequest {
            password: Some("short".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
