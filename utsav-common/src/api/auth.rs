//! Session-token authentication
//!
//! Pure password-hashing functions plus the database operations that mint
//! and resolve bearer tokens. No HTTP framework dependencies here; the
//! axum extractor lives in the server crate.

use crate::db::models::Role;
use crate::Result;
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

/// An authenticated account as seen by request handlers
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,
}

// ========================================
// Password Hashing
// ========================================

/// Generate a random hex salt
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt (SHA-256, 64 hex characters)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-shape comparison of a candidate password against stored hash/salt
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(password, salt) == stored_hash
}

// ========================================
// Session Tokens
// ========================================

/// Mint a session token for a user.
///
/// Token lifetime comes from the `session_timeout_seconds` setting.
pub async fn create_session(pool: &SqlitePool, user_guid: Uuid) -> Result<String> {
    let timeout_secs: i64 = crate::db::settings::get_setting(pool, "session_timeout_seconds")
        .await?
        .unwrap_or(31_536_000);

    let token = Uuid::new_v4().simple().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(timeout_secs);

    sqlx::query("INSERT INTO sessions (token, user_guid, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_guid)
        .bind(now)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolve a bearer token to its principal, ignoring expired sessions
pub async fn authenticate_token(pool: &SqlitePool, token: &str) -> Result<Option<Principal>> {
    let row: Option<(Uuid, Role, String, String)> = sqlx::query_as(
        r#"
        SELECT u.guid, u.role, u.name, u.email
        FROM sessions s
        JOIN users u ON u.guid = s.user_guid
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, role, name, email)| Principal { id, role, name, email }))
}

/// Drop a session (logout)
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}
