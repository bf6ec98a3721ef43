//! Postgres-backed credential and session store.
//!
//! Schema lives in `sql/schema.sql`. Uniqueness on `username` is enforced by
//! the database; a duplicate insert surfaces as [`StoreError::Conflict`] via
//! SQLSTATE 23505 so callers can distinguish a lost race from a real failure.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{NewUser, SessionToken, StoreError, User, UserStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        display_name: row.get("display_name"),
        secret: row.get("secret"),
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, display_name, secret";

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by username")?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by id")?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (username, password_hash, display_name) \
             VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.display_name)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(user_from_row(&row)),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to insert user")
                .into()),
        }
    }

    async fn set_secret(&self, id: Uuid, secret: &str) -> Result<bool, StoreError> {
        let query = "UPDATE users SET secret = $2 WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(id)
            .bind(secret)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update secret")?;

        Ok(result.rows_affected() > 0)
    }

    async fn users_with_secrets(&self) -> Result<Vec<User>, StoreError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE secret IS NOT NULL ORDER BY created_at"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list users with secrets")?;

        Ok(rows.iter().map(user_from_row).collect())
    }
}

#[async_trait]
impl super::SessionStore for PgStore {
    async fn create(
        &self,
        token_hash: &[u8],
        session: SessionToken,
        ttl_seconds: i64,
    ) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO sessions (token_hash, user_id, username, expires_at)
            VALUES ($1, $2, $3, NOW() + ($4 * INTERVAL '1 second'))
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token_hash)
            .bind(session.user_id)
            .bind(&session.username)
            .bind(ttl_seconds)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert session")?;

        Ok(())
    }

    async fn find(&self, token_hash: &[u8]) -> Result<Option<SessionToken>, StoreError> {
        let query =
            "SELECT user_id, username FROM sessions WHERE token_hash = $1 AND expires_at > NOW()";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session")?;

        Ok(row.map(|row| SessionToken {
            user_id: row.get("user_id"),
            username: row.get("username"),
        }))
    }

    async fn delete(&self, token_hash: &[u8]) -> Result<(), StoreError> {
        let query = "DELETE FROM sessions WHERE token_hash = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete session")?;

        Ok(())
    }
}
