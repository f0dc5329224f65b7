//! Authentication service - credential checks and bearer token lifecycle.
//!
//! Tokens are HS256 JWTs carrying a `jti` that must match a row in the
//! personal access token table. Deleting that row revokes the token even
//! before it expires.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, ACCESS_TOKEN_NAME, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub jti: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 2592000)]
    pub expires_in: i64,
}

/// Outcome of a logout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RevokedToken {
    pub token_id: String,
    pub revoked: bool,
}

/// Authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// `jti` of the token used for this request
    pub token_id: String,
}

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check an email/password pair, returning the matching user
    async fn attempt(&self, email: &str, password: &str) -> AppResult<User>;

    /// Issue and record a new bearer token for `user`
    async fn issue_token(&self, user: &User) -> AppResult<TokenResponse>;

    /// Resolve a raw bearer token to its user; fails for revoked tokens
    async fn authenticate(&self, token: &str) -> AppResult<CurrentUser>;

    /// Revoke one token by its identifier
    async fn revoke(&self, token_id: &str) -> AppResult<RevokedToken>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    fn decode(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn attempt(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self.uow.users().find_by_email(email).await?;

        // Verify against a dummy hash when the email is unknown so both
        // paths cost one Argon2 verification.
        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::dummy(),
        };
        let password_valid = stored.verify(password);

        match user {
            Some(user) if password_valid => Ok(user),
            _ => {
                tracing::debug!(email, "Credential check failed");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours);
        let token_id = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user.id,
            jti: token_id.clone(),
            role: user.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?;

        self.uow
            .tokens()
            .create(user.id, ACCESS_TOKEN_NAME.to_string(), token_id, expires_at)
            .await?;

        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_hours * SECONDS_PER_HOUR,
        })
    }

    async fn authenticate(&self, token: &str) -> AppResult<CurrentUser> {
        let claims = self.decode(token)?;

        let record = self
            .uow
            .tokens()
            .find_by_token_id(&claims.jti)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if record.user_id != claims.sub || record.is_expired(Utc::now()) {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            user,
            token_id: record.token_id,
        })
    }

    async fn revoke(&self, token_id: &str) -> AppResult<RevokedToken> {
        let revoked = self.uow.tokens().revoke(token_id).await?;
        if revoked {
            tracing::info!(token_id, "Token revoked");
        }

        Ok(RevokedToken {
            token_id: token_id.to_string(),
            revoked,
        })
    }
}
