//! Shared API response types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Structured error body returned by every endpoint.
///
/// Beyond the human-readable message, conflict and closed-registration
/// responses carry machine-readable flags so clients can branch without
/// parsing message text.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_closed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_registered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorBody {
    /// Plain error message with no flags
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            registration_closed: None,
            already_registered: None,
            registration_id: None,
            registration_date: None,
            details: None,
        }
    }
}
