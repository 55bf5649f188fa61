//! Admission validation rules
//!
//! Pure checks shared by both submission channels. Each returns the first
//! violated rule; the engine applies them in a fixed fail-fast order.

use crate::db::registrations::NewRegistration;
use crate::registration::LeaderDetails;
use crate::{Error, Result};
use utsav_common::db::models::Event;

/// Check the submitted team size against the event's capacity rule
pub fn check_team_size(event: &Event, team_size: i64) -> Result<()> {
    match event.size_bounds() {
        Some((min, max)) => {
            if team_size < min {
                return Err(Error::TeamSizeTooSmall { min });
            }
            if team_size > max {
                return Err(Error::TeamSizeTooLarge { max });
            }
            Ok(())
        }
        None => {
            // Individual or duo events require the exact size
            if team_size != event.team_size {
                return Err(Error::TeamSizeMismatch { expected: event.team_size });
            }
            Ok(())
        }
    }
}

/// Larger teams must carry a non-empty team name
pub fn check_team_name(team_name: Option<&str>, team_size: i64) -> Result<()> {
    if team_size > 2 && team_name.map_or(true, |n| n.trim().is_empty()) {
        return Err(Error::TeamNameRequired);
    }
    Ok(())
}

/// College name and USN must both be present; returns them trimmed
pub fn check_leader_details(details: Option<&LeaderDetails>) -> Result<(String, String)> {
    let details = details.ok_or(Error::LeaderDetailsRequired)?;
    let college = details.college_name.as_deref().map(str::trim).unwrap_or("");
    let usn = details.usn.as_deref().map(str::trim).unwrap_or("");
    if college.is_empty() || usn.is_empty() {
        return Err(Error::LeaderDetailsRequired);
    }
    Ok((college.to_string(), usn.to_string()))
}

/// Document-level validation, applied to the assembled record just before
/// insert. Field errors are aggregated rather than fail-fast so the client
/// sees everything wrong at once.
pub fn validate_document(new: &NewRegistration) -> Result<()> {
    let mut errors = Vec::new();

    if new.team_size < 1 {
        errors.push("Team size must be at least 1".to_string());
    }
    if new.team_size > 1 && new.team_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        errors.push(
            "Team name is required for team events with more than 1 participant".to_string(),
        );
    }
    if new.leader_college.trim().is_empty() {
        errors.push("Team leader college name is required".to_string());
    }
    if new.leader_usn.trim().is_empty() {
        errors.push("Team leader USN is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}
