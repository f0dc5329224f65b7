//! User service - registration, login, profile and logout use cases.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::auth_service::{AuthService, CurrentUser, RevokedToken, TokenResponse};
use crate::domain::{NewUser, Password, User, UserChanges};
use crate::errors::{AppResult, FieldErrors};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const USERNAME_TAKEN: &str = "The username has already been taken.";
const EMAIL_TAKEN: &str = "The email has already been taken.";

/// Validated registration input
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Validated profile update; `None` fields stay unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Token plus the user it was issued for
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthPayload {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub user: User,
}

impl AuthPayload {
    fn new(token: TokenResponse, user: User) -> Self {
        Self {
            access_token: token.access_token,
            token_type: token.token_type,
            user,
        }
    }
}

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create an account and sign it in
    async fn register(&self, input: RegisterUser) -> AppResult<AuthPayload>;

    /// Check credentials and issue a fresh token
    async fn login(&self, email: String, password: String) -> AppResult<AuthPayload>;

    /// Profile of the authenticated caller
    async fn fetch(&self, current: &CurrentUser) -> AppResult<User>;

    /// Apply a partial profile update for the caller
    async fn update_profile(&self, current: &CurrentUser, update: ProfileUpdate)
        -> AppResult<User>;

    /// Revoke the token used for the current request
    async fn logout(&self, current: &CurrentUser) -> AppResult<RevokedToken>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    auth: Arc<dyn AuthService>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, auth: Arc<dyn AuthService>) -> Self {
        Self { uow, auth }
    }

    /// Collect "already taken" errors for the given username/email,
    /// ignoring rows owned by `except`.
    async fn check_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<i32>,
    ) -> AppResult<()> {
        let users = self.uow.users();

        let (by_username, by_email) = tokio::try_join!(
            async {
                match username {
                    Some(username) => users.find_by_username(username).await,
                    None => Ok(None),
                }
            },
            async {
                match email {
                    Some(email) => users.find_by_email(email).await,
                    None => Ok(None),
                }
            },
        )?;

        let taken = |found: Option<User>| found.is_some_and(|u| Some(u.id) != except);

        let mut errors = FieldErrors::new();
        if taken(by_username) {
            errors.add("username", USERNAME_TAKEN);
        }
        if taken(by_email) {
            errors.add("email", EMAIL_TAKEN);
        }
        errors.into_result()
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn register(&self, input: RegisterUser) -> AppResult<AuthPayload> {
        self.check_unique(Some(&input.username), Some(&input.email), None)
            .await?;

        let password_hash = Password::new(&input.password)?.into_string();

        let user = self
            .uow
            .users()
            .create(NewUser {
                name: input.name,
                username: input.username,
                email: input.email,
                phone: input.phone,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");

        let token = self.auth.issue_token(&user).await?;
        Ok(AuthPayload::new(token, user))
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthPayload> {
        let user = self.auth.attempt(&email, &password).await?;
        let token = self.auth.issue_token(&user).await?;

        tracing::info!(user_id = user.id, "User authenticated");

        Ok(AuthPayload::new(token, user))
    }

    async fn fetch(&self, current: &CurrentUser) -> AppResult<User> {
        Ok(current.user.clone())
    }

    async fn update_profile(
        &self,
        current: &CurrentUser,
        update: ProfileUpdate,
    ) -> AppResult<User> {
        self.check_unique(
            update.username.as_deref(),
            update.email.as_deref(),
            Some(current.id()),
        )
        .await?;

        let password_hash = match update.password.as_deref() {
            Some(plain) => Some(Password::new(plain)?.into_string()),
            None => None,
        };

        let changes = UserChanges {
            name: update.name,
            username: update.username,
            email: update.email,
            phone: update.phone,
            password_hash,
        };

        self.uow.users().update(current.id(), changes).await
    }

    async fn logout(&self, current: &CurrentUser) -> AppResult<RevokedToken> {
        self.auth.revoke(&current.token_id).await
    }
}
