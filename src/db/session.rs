//! Session repository backing token revocation.

use super::DbPool;
use crate::{Result, VaultError};

const SQL_NOW: &str = "datetime('now')";

/// A live login session.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Session ID.
    pub id: i64,
    /// Owning user ID.
    pub user_id: i64,
    /// Token identifier (`jti` claim).
    pub token_id: String,
    /// Expiration timestamp.
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// New session for creation.
pub struct NewSession {
    /// Owning user ID.
    pub user_id: i64,
    /// Token identifier.
    pub token_id: String,
    /// Expiration timestamp (`%Y-%m-%d %H:%M:%S`, UTC).
    pub expires_at: String,
}

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Record a new session.
    pub async fn create(&self, new_session: &NewSession) -> Result<Session> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO sessions (user_id, token_id, expires_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(new_session.user_id)
        .bind(&new_session.token_id)
        .bind(&new_session.expires_at)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("session".to_string()))
    }

    /// Get a session by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token_id, expires_at, created_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(session)
    }

    /// Get an unexpired session by token identifier.
    pub async fn get_valid(&self, token_id: &str) -> Result<Option<Session>> {
        let sql = format!(
            "SELECT id, user_id, token_id, expires_at, created_at
             FROM sessions
             WHERE token_id = ? AND expires_at > {}",
            SQL_NOW
        );
        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(token_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(session)
    }

    /// Delete a session. Returns false if it did not exist.
    pub async fn delete(&self, token_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_id = ?")
            .bind(token_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let sql = format!("DELETE FROM sessions WHERE expires_at <= {}", SQL_NOW);
        let result = sqlx::query(&sql).execute(self.pool).await?;

        Ok(result.rows_affected())
    }
}
