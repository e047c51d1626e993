// src/infrastructure/repositories/refresh_tokens.rs
use super::{corrupt_row, map_sqlx};
use crate::domain::auth::{
    NewRefreshToken, RefreshTokenId, RefreshTokenRecord, RefreshTokenRepository, TokenDigest,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::user::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

const RETURNING: &str = "RETURNING id, user_id, token_digest, expires_at, revoked, created_at";

#[derive(Clone)]
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_in(
        tx: &mut Transaction<'_, Postgres>,
        token: NewRefreshToken,
    ) -> DomainResult<RefreshTokenRecord> {
        let NewRefreshToken {
            user_id,
            token_digest,
            expires_at,
            created_at,
        } = token;

        let row = sqlx::query_as::<_, RefreshTokenRow>(&format!(
            "INSERT INTO refresh_tokens (user_id, token_digest, expires_at, revoked, created_at)
             VALUES ($1, $2, $3, FALSE, $4)
             {RETURNING}"
        ))
        .bind(i64::from(user_id))
        .bind(token_digest.as_str())
        .bind(expires_at)
        .bind(created_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx)?;

        RefreshTokenRecord::try_from(row)
    }
}

#[derive(Debug, FromRow)]
struct RefreshTokenRow {
    id: i64,
    user_id: i64,
    token_digest: String,
    expires_at: DateTime<Utc>,
    revoked: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<RefreshTokenRow> for RefreshTokenRecord {
    type Error = DomainError;

    fn try_from(row: RefreshTokenRow) -> Result<Self, Self::Error> {
        let corrupt = corrupt_row("refresh_tokens");
        Ok(RefreshTokenRecord {
            id: RefreshTokenId::new(row.id).map_err(&corrupt)?,
            user_id: UserId::new(row.user_id).map_err(&corrupt)?,
            token_digest: TokenDigest::new(row.token_digest).map_err(&corrupt)?,
            expires_at: row.expires_at,
            revoked: row.revoked,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn insert(&self, token: NewRefreshToken) -> DomainResult<RefreshTokenRecord> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        let record = Self::insert_in(&mut tx, token).await?;
        tx.commit().await.map_err(map_sqlx)?;
        Ok(record)
    }

    async fn find_by_digest(
        &self,
        digest: &TokenDigest,
    ) -> DomainResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT id, user_id, token_digest, expires_at, revoked, created_at
             FROM refresh_tokens WHERE token_digest = $1",
        )
        .bind(digest.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(RefreshTokenRecord::try_from).transpose()
    }

    async fn rotate(
        &self,
        id: RefreshTokenId,
        replacement: NewRefreshToken,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<RefreshTokenRecord>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // The row lock taken by this UPDATE serialises concurrent rotations of
        // the same token; the loser sees revoked = TRUE and matches nothing.
        let revoked = sqlx::query(
            "UPDATE refresh_tokens
             SET revoked = TRUE, revoked_at = $2
             WHERE id = $1 AND revoked = FALSE AND expires_at > $2",
        )
        .bind(i64::from(id))
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?
        .rows_affected();

        if revoked == 0 {
            tx.rollback().await.map_err(map_sqlx)?;
            return Ok(None);
        }

        let record = Self::insert_in(&mut tx, replacement).await?;
        tx.commit().await.map_err(map_sqlx)?;
        Ok(Some(record))
    }

    async fn revoke(&self, id: RefreshTokenId, now: DateTime<Utc>) -> DomainResult<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE, revoked_at = $2
             WHERE id = $1 AND revoked = FALSE",
        )
        .bind(i64::from(id))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> DomainResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE, revoked_at = $2
             WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(i64::from(user_id))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(result.rows_affected())
    }
}
