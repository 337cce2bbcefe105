use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use liftgate_application::ApiTokenRepository;
use liftgate_core::{AppError, AppResult, NonEmptyString, UserId};
use liftgate_domain::{EmailAddress, User};

/// PostgreSQL-backed lookup of bearer token digests.
#[derive(Clone)]
pub struct PostgresApiTokenRepository {
    pool: PgPool,
}

impl PostgresApiTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TokenOwnerRow {
    id: Uuid,
    email: String,
    display_name: String,
}

#[async_trait]
impl ApiTokenRepository for PostgresApiTokenRepository {
    async fn find_user_by_token_hash(&self, token_hash: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, TokenOwnerRow>(
            r#"
            SELECT users.id, users.email, users.display_name
            FROM api_tokens
            INNER JOIN users
                ON users.id = api_tokens.user_id
            WHERE api_tokens.token_hash = $1
              AND api_tokens.revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve api token: {error}")))?;

        row.map(|row| {
            Ok(User::new(
                UserId::from_uuid(row.id),
                EmailAddress::new(row.email)?,
                NonEmptyString::new(row.display_name)?,
                None,
            ))
        })
        .transpose()
    }
}
