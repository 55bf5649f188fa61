//! Event catalog database access
//!
//! Events are read-only to the admission engine. Writes here serve seeding
//! and the admin open/close toggle; general event CRUD is not exposed.

use crate::Result;
use sqlx::{Pool, Sqlite};
use utsav_common::db::models::Event;
use uuid::Uuid;

/// Insert payload for a new event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub fees: i64,
    pub category: String,
    pub team_size: i64,
    pub min_team_size: Option<i64>,
    pub max_team_size: Option<i64>,
    pub is_variable_team_size: bool,
    pub registration_open: bool,
}

/// Look up an event by id
pub async fn find_event(db: &Pool<Sqlite>, event_id: Uuid) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>(
        "SELECT guid, name, fees, category, team_size, min_team_size, max_team_size, \
                is_variable_team_size, registration_open \
         FROM events WHERE guid = ?",
    )
    .bind(event_id)
    .fetch_optional(db)
    .await?;

    Ok(event)
}

/// Create an event and return the stored row
pub async fn insert_event(db: &Pool<Sqlite>, new: &NewEvent) -> Result<Event> {
    let guid = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO events \
         (guid, name, fees, category, team_size, min_team_size, max_team_size, \
          is_variable_team_size, registration_open) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(guid)
    .bind(&new.name)
    .bind(new.fees)
    .bind(&new.category)
    .bind(new.team_size)
    .bind(new.min_team_size)
    .bind(new.max_team_size)
    .bind(new.is_variable_team_size)
    .bind(new.registration_open)
    .execute(db)
    .await?;

    Ok(Event {
        guid,
        name: new.name.clone(),
        fees: new.fees,
        category: new.category.clone(),
        team_size: new.team_size,
        min_team_size: new.min_team_size,
        max_team_size: new.max_team_size,
        is_variable_team_size: new.is_variable_team_size,
        registration_open: new.registration_open,
    })
}

/// Set the registration-open flag
pub async fn set_registration_open(db: &Pool<Sqlite>, event_id: Uuid, open: bool) -> Result<()> {
    sqlx::query(
        "UPDATE events SET registration_open = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(open)
    .bind(event_id)
    .execute(db)
    .await?;

    Ok(())
}
