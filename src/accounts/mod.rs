//! Credential store: user rows, password hashing and per-user counters.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Utc};
use rand_core::OsRng;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const USER_COLUMNS: &str = "id, name, email, password_hash, grade, created_at, total_notes, downloads, quizzes_taken, study_streak";

#[derive(Clone, Debug, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub grade: String,
    pub created_at: DateTime<Utc>,
    pub total_notes: i64,
    pub downloads: i64,
    pub quizzes_taken: i64,
    pub study_streak: i64,
}

/// Activity counters reported alongside the profile.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserCounters {
    pub total_notes: i64,
    pub downloads: i64,
    pub quizzes_taken: i64,
    pub study_streak: i64,
}

/// Public view of a user; the password hash never leaves the store.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub grade: String,
    pub created_at: DateTime<Utc>,
    pub stats: UserCounters,
}

impl User {
    pub fn counters(&self) -> UserCounters {
        UserCounters {
            total_notes: self.total_notes,
            downloads: self.downloads,
            quizzes_taken: self.quizzes_taken,
            study_streak: self.study_streak,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            grade: self.grade.clone(),
            created_at: self.created_at,
            stats: self.counters(),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Inserts a new user. Email uniqueness is enforced by the table constraint, so two racing
/// signups for the same address cannot both succeed.
pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    grade: Option<&str>,
) -> AppResult<User> {
    let user = User {
        id: Uuid::new_v4(),
        name: name.trim().to_string(),
        email: normalize_email(email),
        password_hash: password_hash.to_string(),
        grade: grade.map(str::trim).unwrap_or_default().to_string(),
        created_at: Utc::now(),
        total_notes: 0,
        downloads: 0,
        quizzes_taken: 0,
        study_streak: 0,
    };

    let result = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, grade, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.grade)
    .bind(user.created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            info!(user_id = %user.id, "registered new user");
            Ok(user)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            AppError::Conflict("Email already registered".to_string()),
        ),
        Err(err) => Err(err.into()),
    }
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn increment_downloads(pool: &SqlitePool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET downloads = downloads + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed = PasswordHash::new(password_hash);
    match parsed {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}
