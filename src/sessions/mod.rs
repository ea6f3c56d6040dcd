//! Server-side sessions keyed by opaque random tokens.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const SESSION_TTL_HOURS: i64 = 24;
pub const REMEMBER_ME_TTL_DAYS: i64 = 30;
const TOKEN_BYTES: usize = 32;

#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Lifetime left at creation, used for the cookie `Max-Age`.
    pub fn ttl(&self) -> Duration {
        self.expires_at - self.created_at
    }
}

pub fn session_ttl(remember_me: bool) -> Duration {
    if remember_me {
        Duration::days(REMEMBER_ME_TTL_DAYS)
    } else {
        Duration::hours(SESSION_TTL_HOURS)
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub async fn create(pool: &SqlitePool, user_id: Uuid, remember_me: bool) -> AppResult<Session> {
    create_with_ttl(pool, user_id, session_ttl(remember_me)).await
}

pub async fn create_with_ttl(
    pool: &SqlitePool,
    user_id: Uuid,
    ttl: Duration,
) -> AppResult<Session> {
    let created_at = Utc::now();
    let session = Session {
        token: generate_token(),
        user_id,
        expires_at: created_at + ttl,
        created_at,
    };

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(pool)
        .await?;

    Ok(session)
}

/// Resolves a token to its owner. Read-only, so concurrent checks need no coordination.
pub async fn validate(pool: &SqlitePool, token: Option<&str>) -> AppResult<Uuid> {
    let token = token
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthenticated)?;

    let user_id: Option<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ? AND expires_at > ?")
            .bind(token)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await?;

    user_id.ok_or(AppError::Unauthenticated)
}

pub async fn destroy(pool: &SqlitePool, token: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn purge_expired(pool: &SqlitePool) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
