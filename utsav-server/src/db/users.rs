//! User account database access

use crate::{Error, Result};
use sqlx::{Pool, Sqlite};
use utsav_common::api::auth;
use utsav_common::db::models::{Role, User};
use uuid::Uuid;

/// Create an account with a salted password hash.
///
/// Email and mobile are unique; a violation surfaces as a field-level
/// validation error rather than a server error.
pub async fn create_user(
    db: &Pool<Sqlite>,
    name: &str,
    email: &str,
    mobile: &str,
    password: &str,
    role: Role,
) -> Result<User> {
    let guid = Uuid::new_v4();
    let salt = auth::generate_salt();
    let hash = auth::hash_password(password, &salt);

    let result = sqlx::query(
        "INSERT INTO users (guid, name, email, mobile, password_hash, password_salt, role) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(guid)
    .bind(name)
    .bind(email)
    .bind(mobile)
    .bind(&hash)
    .bind(&salt)
    .bind(role)
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(User {
            guid,
            name: name.to_string(),
            email: email.to_string(),
            mobile: mobile.to_string(),
            role,
        }),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(Error::Validation(vec![
                "An account with this email or mobile already exists".to_string(),
            ]))
        }
        Err(e) => Err(e.into()),
    }
}

/// Look up an account by id
pub async fn find_user(db: &Pool<Sqlite>, guid: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT guid, name, email, mobile, role FROM users WHERE guid = ?",
    )
    .bind(guid)
    .fetch_optional(db)
    .await?;

    Ok(user)
}

/// Verify an email/password pair; returns the account on success
pub async fn verify_credentials(
    db: &Pool<Sqlite>,
    email: &str,
    password: &str,
) -> Result<Option<User>> {
    let row: Option<(Uuid, String, String, String, Role, String, String)> = sqlx::query_as(
        "SELECT guid, name, email, mobile, role, password_hash, password_salt \
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    let Some((guid, name, email, mobile, role, hash, salt)) = row else {
        return Ok(None);
    };

    if !auth::verify_password(password, &salt, &hash) {
        return Ok(None);
    }

    Ok(Some(User { guid, name, email, mobile, role }))
}
