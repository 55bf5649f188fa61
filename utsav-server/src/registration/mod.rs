//! Registration admission: validation rules, payment classification, engine

pub mod engine;
pub mod payment;
pub mod rules;

pub use engine::RegistrationEngine;

use serde::Deserialize;
use utsav_common::db::models::{PaymentMode, PaymentStatus, TeamMember};

/// The actual participant's identity as submitted.
///
/// College name and USN are mandatory; the remaining fields are only stored
/// for spot submissions, where the record does not belong to the participant's
/// own account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderDetails {
    pub college_name: Option<String>,
    pub usn: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

fn default_team_size() -> i64 {
    1
}

/// Self-service submission payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelfRegistrationRequest {
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default = "default_team_size")]
    pub team_size: i64,
    pub team_leader_details: Option<LeaderDetails>,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
}

/// Venue desk ("spot") submission payload.
///
/// The point-of-sale flow may have already settled payment, in which case the
/// explicit `payment_status` is trusted as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotRegistrationRequest {
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default = "default_team_size")]
    pub team_size: i64,
    pub team_leader_details: Option<LeaderDetails>,
    pub college_code: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_mode: Option<PaymentMode>,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}
