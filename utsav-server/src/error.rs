//! Error types for utsav-server
//!
//! The admission taxonomy carries enough data for clients to act on a
//! rejection: conflicts return the existing registration's identity, size
//! failures return the violated bound. Conflicts are idempotent client
//! errors, never server errors, whether caught by the pre-check or by the
//! store's unique index.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Main error type for utsav-server
#[derive(Error, Debug)]
pub enum Error {
    /// Wrong account role for the endpoint
    #[error("Only {expected} accounts can use this endpoint")]
    ForbiddenRole { expected: &'static str },

    /// Event does not exist
    #[error("Event not found")]
    EventNotFound,

    /// Registration does not exist
    #[error("Registration not found")]
    RegistrationNotFound,

    /// Event is not accepting entries
    #[error("Registration for this event is currently closed")]
    RegistrationClosed,

    /// Submitted team is below the event's minimum size
    #[error("Team size cannot be less than {min}")]
    TeamSizeTooSmall { min: i64 },

    /// Submitted team exceeds the event's maximum size
    #[error("Team size cannot exceed {max}")]
    TeamSizeTooLarge { max: i64 },

    /// Fixed-size event requires an exact match
    #[error("Team size must be {expected} members")]
    TeamSizeMismatch { expected: i64 },

    /// Larger teams must carry a team name
    #[error("Team name is required for teams with more than 2 members")]
    TeamNameRequired,

    /// Team leader college name and USN are mandatory
    #[error("Team leader details are required")]
    LeaderDetailsRequired,

    /// The submitting account already holds a registration for this event
    #[error("You have already registered for this event")]
    AlreadyRegistered {
        registration_id: Option<Uuid>,
        registered_at: Option<DateTime<Utc>>,
    },

    /// A spot registration already exists for this team
    #[error("A team registration already exists for \"{team_name}\" in this event")]
    DuplicateTeam { team_name: String },

    /// The participant USN is already spot-registered for this event
    #[error("Participant {usn} is already registered for this event")]
    DuplicateParticipant { usn: String },

    /// Authenticated, but not allowed to touch this record
    #[error("Not allowed to modify this registration")]
    Forbidden,

    /// Aggregated field-level validation failures
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Email delivery errors
    #[error("Mail error: {0}")]
    Mail(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Errors bubbled up from the common crate
    #[error(transparent)]
    Common(#[from] utsav_common::Error),
}

/// Convenience Result type using utsav-server Error
pub type Result<T> = std::result::Result<T, Error>;
