// src/infrastructure/repositories/verification_codes.rs
use super::{corrupt_row, map_sqlx};
use crate::domain::auth::{
    CodeRedemption, NewVerificationCode, TokenDigest, VerificationCodeId, VerificationCodeRecord,
    VerificationCodeRepository, VerificationKind,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::user::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

#[derive(Clone)]
pub struct PostgresVerificationCodeRepository {
    pool: PgPool,
}

impl PostgresVerificationCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct VerificationCodeRow {
    id: i64,
    user_id: i64,
    kind: String,
    code_digest: String,
    expires_at: DateTime<Utc>,
    consumed: bool,
    failed_attempts: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<VerificationCodeRow> for VerificationCodeRecord {
    type Error = DomainError;

    fn try_from(row: VerificationCodeRow) -> Result<Self, Self::Error> {
        let corrupt = corrupt_row("verification_codes");
        Ok(VerificationCodeRecord {
            id: VerificationCodeId::new(row.id).map_err(&corrupt)?,
            user_id: UserId::new(row.user_id).map_err(&corrupt)?,
            kind: row.kind.parse::<VerificationKind>().map_err(&corrupt)?,
            code_digest: TokenDigest::new(row.code_digest).map_err(&corrupt)?,
            expires_at: row.expires_at,
            consumed: row.consumed,
            failed_attempts: u32::try_from(row.failed_attempts).map_err(|_| {
                DomainError::persistence("negative failed_attempts on verification code")
            })?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl VerificationCodeRepository for PostgresVerificationCodeRepository {
    async fn replace_open(&self, code: NewVerificationCode) -> DomainResult<VerificationCodeRecord> {
        let NewVerificationCode {
            user_id,
            kind,
            code_digest,
            expires_at,
            created_at,
        } = code;

        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // Locking the owner row serialises concurrent issues for one account,
        // so the partial unique index never sees two open codes.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(i64::from(user_id))
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| DomainError::NotFound("user not found".into()))?;

        sqlx::query(
            "UPDATE verification_codes SET consumed = TRUE, consumed_at = $3
             WHERE user_id = $1 AND kind = $2 AND consumed = FALSE",
        )
        .bind(i64::from(user_id))
        .bind(kind.as_str())
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        let row = sqlx::query_as::<_, VerificationCodeRow>(
            "INSERT INTO verification_codes
                 (user_id, kind, code_digest, expires_at, consumed, failed_attempts, created_at)
             VALUES ($1, $2, $3, $4, FALSE, 0, $5)
             RETURNING id, user_id, kind, code_digest, expires_at, consumed, failed_attempts, created_at",
        )
        .bind(i64::from(user_id))
        .bind(kind.as_str())
        .bind(code_digest.as_str())
        .bind(expires_at)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;
        VerificationCodeRecord::try_from(row)
    }

    async fn find_usable(
        &self,
        user_id: UserId,
        kind: VerificationKind,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<VerificationCodeRecord>> {
        let rows = sqlx::query_as::<_, VerificationCodeRow>(
            "SELECT id, user_id, kind, code_digest, expires_at, consumed, failed_attempts, created_at
             FROM verification_codes
             WHERE user_id = $1 AND kind = $2 AND consumed = FALSE AND expires_at > $3
             ORDER BY created_at DESC",
        )
        .bind(i64::from(user_id))
        .bind(kind.as_str())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.into_iter()
            .map(VerificationCodeRecord::try_from)
            .collect()
    }

    async fn register_failed_attempt(
        &self,
        id: VerificationCodeId,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let max_attempts = i32::try_from(max_attempts).unwrap_or(i32::MAX);

        sqlx::query(
            "UPDATE verification_codes
             SET failed_attempts = failed_attempts + 1,
                 consumed = (failed_attempts + 1 >= $2),
                 consumed_at = CASE WHEN failed_attempts + 1 >= $2 THEN $3 ELSE consumed_at END
             WHERE id = $1 AND consumed = FALSE",
        )
        .bind(i64::from(id))
        .bind(max_attempts)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn redeem(
        &self,
        id: VerificationCodeId,
        user_id: UserId,
        redemption: CodeRedemption,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let consumed = sqlx::query(
            "UPDATE verification_codes SET consumed = TRUE, consumed_at = $4
             WHERE id = $1 AND user_id = $2 AND kind = $3
               AND consumed = FALSE AND expires_at > $4",
        )
        .bind(i64::from(id))
        .bind(i64::from(user_id))
        .bind(redemption.kind().as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?
        .rows_affected();

        if consumed == 0 {
            tx.rollback().await.map_err(map_sqlx)?;
            return Ok(false);
        }

        let applied = match redemption {
            CodeRedemption::PasswordReset { new_password_hash } => {
                let hash: String = new_password_hash.into();
                sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
                    .bind(i64::from(user_id))
                    .bind(hash)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx)?
                    .rows_affected()
            }
        };

        if applied == 0 {
            tx.rollback().await.map_err(map_sqlx)?;
            return Ok(false);
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(true)
    }
}
