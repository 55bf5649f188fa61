//! Database initialization
//!
//! Creates the database on first run and brings the schema up idempotently.
//! The two partial unique indexes on `registrations` are the load-bearing
//! duplicate-prevention mechanism: concurrent submissions are serialized by
//! the store, not by application-level locking.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer; registration
    // submissions arrive in parallel from the venue desks
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Set busy timeout so racing writers wait instead of erroring immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Schema creation (idempotent - safe to call multiple times)
    create_settings_table(&pool).await?;
    create_users_table(&pool).await?;
    create_sessions_table(&pool).await?;
    create_events_table(&pool).await?;
    create_registrations_table(&pool).await?;

    // Initialize default settings
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            mobile TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'team', 'admin')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL REFERENCES users(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_guid)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the events table
///
/// Capacity rules: `team_size` is the exact required size unless the event is
/// large (`team_size >= 3`) or flagged variable, in which case
/// `min_team_size`/`max_team_size` bound the range with `team_size` as the
/// fallback for either missing bound.
pub async fn create_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            fees INTEGER NOT NULL DEFAULT 0 CHECK (fees >= 0),
            category TEXT NOT NULL CHECK (category IN ('dance', 'music', 'gaming', 'theatre', 'finearts', 'literary', 'other')),
            team_size INTEGER NOT NULL DEFAULT 1 CHECK (team_size >= 1),
            min_team_size INTEGER CHECK (min_team_size IS NULL OR min_team_size >= 1),
            max_team_size INTEGER CHECK (max_team_size IS NULL OR max_team_size >= 1),
            is_variable_team_size INTEGER NOT NULL DEFAULT 0,
            registration_open INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (min_team_size IS NULL OR max_team_size IS NULL OR max_team_size >= min_team_size)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the registrations table and its uniqueness indexes
///
/// Two overlapping partial unique indexes scope duplicate prevention per
/// admission channel:
/// - self-channel (`spot_registered_by IS NULL`): one registration per
///   (event, owning account, participant USN)
/// - spot-channel (`spot_registered_by IS NOT NULL`): one registration per
///   (event, participant USN) regardless of which team member submitted it
pub async fn create_registrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS registrations (
            guid TEXT PRIMARY KEY,
            event_id TEXT NOT NULL REFERENCES events(guid) ON DELETE CASCADE,
            team_leader TEXT NOT NULL REFERENCES users(guid),
            leader_name TEXT,
            leader_email TEXT,
            leader_mobile TEXT,
            leader_college TEXT NOT NULL,
            leader_usn TEXT NOT NULL,
            college_code TEXT,
            team_name TEXT,
            team_members TEXT NOT NULL DEFAULT '[]',
            team_size INTEGER NOT NULL DEFAULT 1 CHECK (team_size >= 1),
            spot_registered_by TEXT REFERENCES users(guid),
            payment_id TEXT,
            order_id TEXT,
            transaction_id TEXT,
            payment_mode TEXT CHECK (payment_mode IS NULL OR payment_mode IN ('cash', 'erp', 'upi', 'online')),
            payment_status TEXT NOT NULL DEFAULT 'pending' CHECK (payment_status IN ('pending', 'completed', 'failed', 'not_required', 'pay_on_event_day', 'payment_required')),
            notes TEXT,
            registered_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Duplicate prevention, self-channel
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_registrations_self_unique
            ON registrations(event_id, team_leader, leader_usn)
            WHERE spot_registered_by IS NULL
        "#,
    )
    .execute(pool)
    .await?;

    // Duplicate prevention, spot-channel
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_registrations_spot_unique
            ON registrations(event_id, leader_usn)
            WHERE spot_registered_by IS NOT NULL
        "#,
    )
    .execute(pool)
    .await?;

    // Lookup indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_registrations_event ON registrations(event_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_registrations_leader ON registrations(team_leader)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_registrations_spot ON registrations(spot_registered_by)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Session and authentication settings
    super::settings::ensure_setting(pool, "session_timeout_seconds", "31536000").await?; // 1 year

    info!("Default settings initialized");
    Ok(())
}
