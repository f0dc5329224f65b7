//! Personal access token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::entities::access_token::{self, ActiveModel, Entity as TokenEntity};
use crate::domain::AccessToken;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Record a freshly issued token
    async fn create(
        &self,
        user_id: i32,
        name: String,
        token_id: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AccessToken>;

    /// Look up a token by its embedded identifier
    async fn find_by_token_id(&self, token_id: &str) -> AppResult<Option<AccessToken>>;

    /// Delete a token; `false` if it did not exist
    async fn revoke(&self, token_id: &str) -> AppResult<bool>;
}

pub struct TokenStore {
    db: DatabaseConnection,
}

impl TokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn create(
        &self,
        user_id: i32,
        name: String,
        token_id: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AccessToken> {
        let active_model = ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            token_id: Set(token_id),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(AccessToken::from(model))
    }

    async fn find_by_token_id(&self, token_id: &str) -> AppResult<Option<AccessToken>> {
        let result = TokenEntity::find()
            .filter(access_token::Column::TokenId.eq(token_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AccessToken::from))
    }

    async fn revoke(&self, token_id: &str) -> AppResult<bool> {
        let result = TokenEntity::delete_many()
            .filter(access_token::Column::TokenId.eq(token_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
