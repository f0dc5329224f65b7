//! Centralized error handling.
//!
//! Provides a unified error type for the entire application, with automatic
//! conversion into the error envelope. Internal details are logged and never
//! sent to clients.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::config::LEGACY_NOT_FOUND_CODE;
use crate::types::Envelope;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Unauthenticated.")]
    Unauthorized,

    #[error("Authentication Failed")]
    InvalidCredentials,

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("The given data was invalid.")]
    Validation(FieldErrors),

    /// Invalid register/login input. The legacy contract reports these
    /// as server errors instead of 422.
    #[error("Authentication Failed")]
    AccountRejected(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[source] DbErr),

    #[error("Invalid or expired token")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::warn!("Unique constraint violated: {}", detail);
                AppError::Conflict("Record".to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(FieldErrors::from(&errors))
    }
}

// =============================================================================
// Field errors
// =============================================================================

/// Validation failures keyed by field path (`items.0.id` for nested input).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error list holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for one field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when empty, otherwise a validation error.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }

    fn collect(&mut self, prefix: &str, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            let path = if prefix.is_empty() {
                (*field).to_string()
            } else {
                format!("{}.{}", prefix, field)
            };

            match kind {
                ValidationErrorsKind::Field(errs) => {
                    for err in errs {
                        let message = err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| default_message(&path, &err.code));
                        self.add(path.clone(), message);
                    }
                }
                ValidationErrorsKind::Struct(nested) => self.collect(&path, nested),
                ValidationErrorsKind::List(entries) => {
                    for (index, nested) in entries {
                        self.collect(&format!("{}.{}", path, index), nested);
                    }
                }
            }
        }
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = Self::new();
        fields.collect("", errors);
        fields
    }
}

fn default_message(field: &str, code: &str) -> String {
    match code {
        "required" => format!("The {} field is required.", field),
        "email" => format!("The {} must be a valid email address.", field),
        "length" => format!("The {} has an invalid length.", field),
        "range" => format!("The {} is out of range.", field),
        _ => format!("The {} is invalid.", field),
    }
}

// =============================================================================
// Status code policy
// =============================================================================

/// How error kinds map onto HTTP status codes.
///
/// `Legacy` reproduces the codes mobile clients were built against
/// (484 for missing records; 500 for bad credentials, duplicates and
/// invalid register/login input);
/// `Standard` uses conventional codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    #[default]
    Legacy,
    Standard,
}

static STATUS_POLICY: OnceCell<StatusPolicy> = OnceCell::new();

impl StatusPolicy {
    /// Install the process-wide policy. Only the first call has effect.
    pub fn install(self) {
        if STATUS_POLICY.set(self).is_err() {
            tracing::debug!("Status policy already installed, keeping {:?}", Self::current());
        }
    }

    /// Policy used when rendering error responses.
    pub fn current() -> Self {
        STATUS_POLICY.get().copied().unwrap_or_default()
    }
}

impl FromStr for StatusPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(StatusPolicy::Legacy),
            "standard" => Ok(StatusPolicy::Standard),
            other => Err(AppError::internal(format!(
                "Unknown STATUS_CODE_POLICY '{}', expected 'legacy' or 'standard'",
                other
            ))),
        }
    }
}

// =============================================================================
// HTTP conversion
// =============================================================================

impl AppError {
    /// HTTP status under the given policy
    pub fn status_under(&self, policy: StatusPolicy) -> StatusCode {
        let legacy = policy == StatusPolicy::Legacy;
        match self {
            AppError::Unauthorized | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials if legacy => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) if legacy => {
                StatusCode::from_u16(LEGACY_NOT_FOUND_CODE).unwrap_or(StatusCode::NOT_FOUND)
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) if legacy => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::AccountRejected(_) if legacy => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::AccountRejected(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Something went wrong".to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT rejected: {:?}", e);
                AppError::Unauthorized.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Something went wrong".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Envelope data payload
    fn details(&self) -> Value {
        match self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::AccountRejected(errors) => {
                json!({ "message": "Something went wrong", "errors": errors })
            }
            AppError::InvalidCredentials => json!({ "message": "Unauthorized" }),
            _ => Value::Null,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_under(StatusPolicy::current());
        let body = Envelope::error(status, self.user_message(), self.details());

        (status, Json(body)).into_response()
    }
}

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, message: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, message: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(message))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }

    /// Re-tag validation failures raised while registering or logging in.
    pub fn into_account_rejection(self) -> Self {
        match self {
            AppError::Validation(errors) => AppError::AccountRejected(errors),
            other => other,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1, message = "Quantity must be at least 1"))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Cart {
        #[validate(required)]
        status: Option<String>,
        #[validate(nested)]
        items: Vec<Line>,
    }

    #[test]
    fn test_legacy_status_codes() {
        let policy = StatusPolicy::Legacy;
        assert_eq!(AppError::not_found("gone").status_under(policy).as_u16(), 484);
        assert_eq!(
            AppError::InvalidCredentials.status_under(policy),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::conflict("User").status_under(policy),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::validation("status", "bad").status_under(policy),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_account_rejection_follows_policy() {
        let rejected = AppError::validation("email", "taken").into_account_rejection();

        assert!(matches!(rejected, AppError::AccountRejected(_)));
        assert_eq!(
            rejected.status_under(StatusPolicy::Legacy),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            rejected.status_under(StatusPolicy::Standard),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(rejected.details()["errors"]["email"][0], "taken");

        let untouched = AppError::InvalidCredentials.into_account_rejection();
        assert!(matches!(untouched, AppError::InvalidCredentials));
    }

    #[test]
    fn test_standard_status_codes() {
        let policy = StatusPolicy::Standard;
        assert_eq!(AppError::not_found("gone").status_under(policy), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidCredentials.status_under(policy),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::conflict("User").status_under(policy), StatusCode::CONFLICT);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("legacy".parse::<StatusPolicy>().unwrap(), StatusPolicy::Legacy);
        assert_eq!(" Standard ".parse::<StatusPolicy>().unwrap(), StatusPolicy::Standard);
        assert!("strict".parse::<StatusPolicy>().is_err());
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::internal("connection refused at 10.0.0.3");
        assert_eq!(err.user_message(), "Something went wrong");
        assert_eq!(err.details(), Value::Null);
    }

    #[test]
    fn test_field_errors_flatten_nested_paths() {
        let cart = Cart {
            status: None,
            items: vec![Line { quantity: 2 }, Line { quantity: 0 }],
        };
        let errors = FieldErrors::from(&cart.validate().unwrap_err());

        assert_eq!(
            errors.get("status").unwrap(),
            ["The status field is required.".to_string()]
        );
        assert_eq!(
            errors.get("items.1.quantity").unwrap(),
            ["Quantity must be at least 1".to_string()]
        );
        assert!(!errors.contains("items.0.quantity"));
    }

    #[test]
    fn test_field_errors_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());

        let result = FieldErrors::single("email", "taken").into_result();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
