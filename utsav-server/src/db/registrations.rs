//! Registration store access
//!
//! The insert is the only write a submission performs, and it is guarded by
//! the channel-scoped partial unique indexes created in `utsav-common`. A
//! unique-index violation is the authoritative duplicate signal and is
//! translated here into the matching conflict error; the engine's pre-check
//! is only an optimistic fast path.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use tracing::warn;
use utsav_common::db::models::{PaymentMode, PaymentStatus, Registration, TeamMember};
use uuid::Uuid;

/// Insert payload for a new registration, assembled by the admission engine
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub guid: Uuid,
    pub event_id: Uuid,
    pub team_leader: Uuid,
    pub leader_name: Option<String>,
    pub leader_email: Option<String>,
    pub leader_mobile: Option<String>,
    pub leader_college: String,
    pub leader_usn: String,
    pub college_code: Option<String>,
    pub team_name: Option<String>,
    pub team_members: Vec<TeamMember>,
    pub team_size: i64,
    pub spot_registered_by: Option<Uuid>,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_mode: Option<PaymentMode>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

/// Optional filters for the admin listing
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub event_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

const REGISTRATION_COLUMNS: &str = "guid, event_id, team_leader, leader_name, leader_email, \
     leader_mobile, leader_college, leader_usn, college_code, team_name, team_members, \
     team_size, spot_registered_by, payment_id, order_id, transaction_id, payment_mode, \
     payment_status, notes, registered_at";

/// Insert a registration.
///
/// A unique-index violation means a concurrent duplicate won the race; it is
/// mapped to the conflict kind of the submission's channel, never surfaced as
/// a generic failure.
pub async fn insert_registration(db: &Pool<Sqlite>, new: &NewRegistration) -> Result<Registration> {
    let registered_at = Utc::now();

    let result = sqlx::query(
        "INSERT INTO registrations \
         (guid, event_id, team_leader, leader_name, leader_email, leader_mobile, \
          leader_college, leader_usn, college_code, team_name, team_members, team_size, \
          spot_registered_by, payment_id, order_id, transaction_id, payment_mode, \
          payment_status, notes, registered_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new.guid)
    .bind(new.event_id)
    .bind(new.team_leader)
    .bind(&new.leader_name)
    .bind(&new.leader_email)
    .bind(&new.leader_mobile)
    .bind(&new.leader_college)
    .bind(&new.leader_usn)
    .bind(&new.college_code)
    .bind(&new.team_name)
    .bind(Json(&new.team_members))
    .bind(new.team_size)
    .bind(new.spot_registered_by)
    .bind(&new.payment_id)
    .bind(&new.order_id)
    .bind(&new.transaction_id)
    .bind(new.payment_mode)
    .bind(new.payment_status)
    .bind(&new.notes)
    .bind(registered_at)
    .execute(db)
    .await;

    match result {
        Ok(_) => find_registration(db, new.guid)
            .await?
            .ok_or(Error::Database(sqlx::Error::RowNotFound)),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            if new.spot_registered_by.is_some() {
                warn!(
                    event_id = %new.event_id,
                    usn = %new.leader_usn,
                    "Spot registration rejected by unique index: participant already registered"
                );
                Err(Error::DuplicateParticipant { usn: new.leader_usn.clone() })
            } else {
                warn!(
                    event_id = %new.event_id,
                    user_id = %new.team_leader,
                    "Registration rejected by unique index: user already registered"
                );
                let existing = find_by_event_and_leader(db, new.event_id, new.team_leader).await?;
                Err(Error::AlreadyRegistered {
                    registration_id: existing.as_ref().map(|r| r.guid),
                    registered_at: existing.as_ref().map(|r| r.registered_at),
                })
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Look up a registration by id
pub async fn find_registration(db: &Pool<Sqlite>, guid: Uuid) -> Result<Option<Registration>> {
    let row = sqlx::query_as::<_, Registration>(&format!(
        "SELECT {} FROM registrations WHERE guid = ?",
        REGISTRATION_COLUMNS
    ))
    .bind(guid)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Find the registration a given account holds for an event (any channel)
pub async fn find_by_event_and_leader(
    db: &Pool<Sqlite>,
    event_id: Uuid,
    team_leader: Uuid,
) -> Result<Option<Registration>> {
    let row = sqlx::query_as::<_, Registration>(&format!(
        "SELECT {} FROM registrations WHERE event_id = ? AND team_leader = ?",
        REGISTRATION_COLUMNS
    ))
    .bind(event_id)
    .bind(team_leader)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Find an existing registration for the same team in an event.
///
/// Used by the spot channel to stop two team members from independently
/// re-submitting the same team.
pub async fn find_team_registration(
    db: &Pool<Sqlite>,
    event_id: Uuid,
    team_name: &str,
    team_size: i64,
) -> Result<Option<Registration>> {
    let row = sqlx::query_as::<_, Registration>(&format!(
        "SELECT {} FROM registrations WHERE event_id = ? AND team_name = ? AND team_size = ?",
        REGISTRATION_COLUMNS
    ))
    .bind(event_id)
    .bind(team_name)
    .bind(team_size)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// All registrations an account is involved in, as leader or spot submitter
pub async fn list_for_user(db: &Pool<Sqlite>, user: Uuid) -> Result<Vec<Registration>> {
    let rows = sqlx::query_as::<_, Registration>(&format!(
        "SELECT {} FROM registrations WHERE team_leader = ? OR spot_registered_by = ? \
         ORDER BY registered_at DESC",
        REGISTRATION_COLUMNS
    ))
    .bind(user)
    .bind(user)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// All registrations for an event, newest first
pub async fn list_for_event(db: &Pool<Sqlite>, event_id: Uuid) -> Result<Vec<Registration>> {
    let rows = sqlx::query_as::<_, Registration>(&format!(
        "SELECT {} FROM registrations WHERE event_id = ? ORDER BY registered_at DESC",
        REGISTRATION_COLUMNS
    ))
    .bind(event_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Admin listing with optional event and date-range filters, newest first
pub async fn list_all(db: &Pool<Sqlite>, filter: &RegistrationFilter) -> Result<Vec<Registration>> {
    let mut builder = sqlx::QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM registrations WHERE 1 = 1",
        REGISTRATION_COLUMNS
    ));

    if let Some(event_id) = filter.event_id {
        builder.push(" AND event_id = ").push_bind(event_id);
    }
    if let Some(start) = filter.start_date {
        builder.push(" AND registered_at >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        builder.push(" AND registered_at <= ").push_bind(end);
    }
    builder.push(" ORDER BY registered_at DESC");

    let rows = builder
        .build_query_as::<Registration>()
        .fetch_all(db)
        .await?;

    Ok(rows)
}

/// Record a completed payment. Narrow transition: sets the external payment
/// reference and forces status to `completed`, nothing else.
pub async fn set_payment_completed(
    db: &Pool<Sqlite>,
    guid: Uuid,
    payment_id: &str,
) -> Result<()> {
    sqlx::query("UPDATE registrations SET payment_id = ?, payment_status = 'completed' WHERE guid = ?")
        .bind(payment_id)
        .bind(guid)
        .execute(db)
        .await?;

    Ok(())
}

/// Delete a registration; returns false when no row matched
pub async fn delete_registration(db: &Pool<Sqlite>, guid: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM registrations WHERE guid = ?")
        .bind(guid)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
