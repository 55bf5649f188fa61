//! Database models shared across the workspace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Account role. Closed set; every entry point matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Team,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Team => "team",
            Role::Admin => "admin",
        }
    }
}

/// How a spot registration was paid at the venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentMode {
    Cash,
    Erp,
    Upi,
    Online,
}

/// Payment obligation of a registration.
///
/// Initial value is decided at creation by the classification policy (or an
/// explicit venue override). The only transition the engine performs is
/// `Pending -> Completed` via the payment-update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    NotRequired,
    PayOnEventDay,
    PaymentRequired,
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub guid: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub role: Role,
}

/// A festival event, read-only to the admission engine
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub guid: Uuid,
    pub name: String,
    /// Entry fee; 0 means free
    pub fees: i64,
    pub category: String,
    /// Nominal/exact team size
    pub team_size: i64,
    pub min_team_size: Option<i64>,
    pub max_team_size: Option<i64>,
    pub is_variable_team_size: bool,
    pub registration_open: bool,
}

impl Event {
    /// Effective team-size bounds.
    ///
    /// Events with `team_size >= 3` or an explicit variable-size flag accept
    /// a range, falling back to `team_size` for whichever bound is unset.
    /// Returns `None` for individual/duo events, which require an exact match.
    pub fn size_bounds(&self) -> Option<(i64, i64)> {
        if self.team_size >= 3 || self.is_variable_team_size {
            Some((
                self.min_team_size.unwrap_or(self.team_size),
                self.max_team_size.unwrap_or(self.team_size),
            ))
        } else {
            None
        }
    }
}

/// An additional participant beyond the team leader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub usn: Option<String>,
    pub college_name: Option<String>,
}

/// A stored registration record.
///
/// Exactly one of two admission channels produced it: self-channel
/// (`spot_registered_by` is NULL) or spot-channel (`spot_registered_by` set
/// to the team-member account that performed the venue submission).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Registration {
    pub guid: Uuid,
    pub event_id: Uuid,
    /// Owning account; for spot submissions, the submitting team member
    pub team_leader: Uuid,
    /// Actual participant identity (always carries college + USN)
    pub leader_name: Option<String>,
    pub leader_email: Option<String>,
    pub leader_mobile: Option<String>,
    pub leader_college: String,
    pub leader_usn: String,
    /// Venue desk college code, spot-channel only
    pub college_code: Option<String>,
    pub team_name: Option<String>,
    pub team_members: Json<Vec<TeamMember>>,
    pub team_size: i64,
    pub spot_registered_by: Option<Uuid>,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_mode: Option<PaymentMode>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    /// True when the record came through the spot channel
    pub fn is_spot_registration(&self) -> bool {
        self.spot_registered_by.is_some()
    }
}
