//! Registration admission engine
//!
//! Validates submissions against event rules, classifies payment, and
//! decides accept/reject for both channels. All validation happens before
//! the single insert, so a submission has no partial-failure states. The
//! duplicate pre-checks are optimistic fast paths only; the store's unique
//! indexes make the final call under concurrency.

use crate::db::registrations::NewRegistration;
use crate::db::{events, registrations};
use crate::registration::{payment, rules, SelfRegistrationRequest, SpotRegistrationRequest};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};
use utsav_common::api::Principal;
use utsav_common::db::models::{PaymentStatus, Registration, Role};
use uuid::Uuid;

/// Result of the read-only registration check
#[derive(Debug, Serialize)]
pub struct RegistrationCheck {
    pub is_registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_details: Option<RegistrationDetails>,
}

/// Summary of an existing registration for client display
#[derive(Debug, Serialize)]
pub struct RegistrationDetails {
    pub team_name: Option<String>,
    pub team_size: i64,
    pub registration_date: DateTime<Utc>,
    pub transaction_id: Option<String>,
    pub payment_status: PaymentStatus,
}

/// The admission engine. Stateless beyond the pool; safe to share.
pub struct RegistrationEngine {
    db: Pool<Sqlite>,
}

impl RegistrationEngine {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Self-service registration by the participant's own account.
    ///
    /// Validation order is fixed and fail-fast: role, event existence,
    /// registration open, team size, team name, leader details, duplicate
    /// pre-check, then the guarded insert.
    pub async fn submit_self(
        &self,
        principal: &Principal,
        event_id: Uuid,
        req: SelfRegistrationRequest,
    ) -> Result<Registration> {
        match principal.role {
            Role::User => {}
            Role::Team | Role::Admin => return Err(Error::ForbiddenRole { expected: "user" }),
        }

        let event = events::find_event(&self.db, event_id)
            .await?
            .ok_or(Error::EventNotFound)?;
        if !event.registration_open {
            return Err(Error::RegistrationClosed);
        }

        rules::check_team_size(&event, req.team_size)?;
        rules::check_team_name(req.team_name.as_deref(), req.team_size)?;
        let (college, usn) = rules::check_leader_details(req.team_leader_details.as_ref())?;

        if let Some(existing) =
            registrations::find_by_event_and_leader(&self.db, event_id, principal.id).await?
        {
            warn!(
                user_id = %principal.id,
                event_id = %event_id,
                registration_id = %existing.guid,
                "Duplicate registration attempt"
            );
            return Err(Error::AlreadyRegistered {
                registration_id: Some(existing.guid),
                registered_at: Some(existing.registered_at),
            });
        }

        let payment_status = payment::classify(&event, &usn, &req.team_members, None);

        let new = NewRegistration {
            guid: Uuid::new_v4(),
            event_id,
            team_leader: principal.id,
            // The record belongs to the participant's own account; contact
            // details stay on the account rather than the record
            leader_name: None,
            leader_email: None,
            leader_mobile: None,
            leader_college: college,
            leader_usn: usn,
            college_code: None,
            team_name: req.team_name,
            team_members: req.team_members,
            team_size: req.team_size,
            spot_registered_by: None,
            payment_id: req.payment_id,
            order_id: req.order_id,
            transaction_id: req.transaction_id,
            payment_mode: None,
            payment_status,
            notes: None,
        };
        rules::validate_document(&new)?;

        let created = registrations::insert_registration(&self.db, &new).await?;
        info!(
            registration_id = %created.guid,
            event_id = %event_id,
            user_id = %principal.id,
            payment_status = ?created.payment_status,
            "Registration created"
        );
        Ok(created)
    }

    /// Venue registration entered by a team-member account on behalf of a
    /// participant. Same event checks as the self channel, plus the
    /// team-level duplicate guard; the participant-level guard is the
    /// spot-channel unique index.
    pub async fn submit_spot(
        &self,
        principal: &Principal,
        event_id: Uuid,
        req: SpotRegistrationRequest,
    ) -> Result<Registration> {
        match principal.role {
            Role::Team => {}
            Role::User | Role::Admin => return Err(Error::ForbiddenRole { expected: "team" }),
        }

        let event = events::find_event(&self.db, event_id)
            .await?
            .ok_or(Error::EventNotFound)?;
        if !event.registration_open {
            return Err(Error::RegistrationClosed);
        }

        rules::check_team_size(&event, req.team_size)?;
        rules::check_team_name(req.team_name.as_deref(), req.team_size)?;
        let (college, usn) = rules::check_leader_details(req.team_leader_details.as_ref())?;

        // Stop two team members from independently re-submitting the same team
        if req.team_size > 1 {
            if let Some(team_name) = req.team_name.as_deref().filter(|n| !n.trim().is_empty()) {
                if registrations::find_team_registration(&self.db, event_id, team_name, req.team_size)
                    .await?
                    .is_some()
                {
                    warn!(
                        event_id = %event_id,
                        team_name = %team_name,
                        "Duplicate team submission attempt"
                    );
                    return Err(Error::DuplicateTeam { team_name: team_name.to_string() });
                }
            }
        }

        // The venue point-of-sale flow may have already settled payment
        let payment_status = payment::classify(&event, &usn, &req.team_members, req.payment_status);
        let payment_mode = req
            .payment_mode
            .or_else(|| req.notes.as_deref().and_then(payment::payment_mode_from_notes));

        let details = req.team_leader_details.unwrap_or_default();
        let new = NewRegistration {
            guid: Uuid::new_v4(),
            event_id,
            team_leader: principal.id,
            leader_name: details.name,
            leader_email: details.email,
            leader_mobile: details.mobile,
            leader_college: college,
            leader_usn: usn,
            college_code: req.college_code,
            team_name: req.team_name,
            team_members: req.team_members,
            team_size: req.team_size,
            spot_registered_by: Some(principal.id),
            payment_id: req.payment_id,
            order_id: req.order_id,
            transaction_id: req.transaction_id,
            payment_mode,
            payment_status,
            notes: req.notes,
        };
        rules::validate_document(&new)?;

        let created = registrations::insert_registration(&self.db, &new).await?;
        info!(
            registration_id = %created.guid,
            event_id = %event_id,
            submitted_by = %principal.id,
            payment_status = ?created.payment_status,
            "Spot registration created"
        );
        Ok(created)
    }

    /// Read-only lookup: is this account already registered for the event?
    pub async fn check_existing(
        &self,
        principal: &Principal,
        event_id: Uuid,
    ) -> Result<RegistrationCheck> {
        if events::find_event(&self.db, event_id).await?.is_none() {
            return Err(Error::EventNotFound);
        }

        let existing =
            registrations::find_by_event_and_leader(&self.db, event_id, principal.id).await?;

        Ok(match existing {
            Some(reg) => RegistrationCheck {
                is_registered: true,
                registration_details: Some(RegistrationDetails {
                    team_name: reg.team_name,
                    team_size: reg.team_size,
                    registration_date: reg.registered_at,
                    transaction_id: reg.transaction_id,
                    payment_status: reg.payment_status,
                }),
            },
            None => RegistrationCheck { is_registered: false, registration_details: None },
        })
    }

    /// Record a completed payment on a registration the principal owns.
    ///
    /// Deliberately narrow: sets the payment reference and forces status to
    /// `completed`; classification is never re-run.
    pub async fn update_payment(
        &self,
        principal: &Principal,
        registration_id: Uuid,
        payment_id: &str,
    ) -> Result<Registration> {
        let reg = registrations::find_registration(&self.db, registration_id)
            .await?
            .ok_or(Error::RegistrationNotFound)?;

        if reg.team_leader != principal.id {
            return Err(Error::Forbidden);
        }

        registrations::set_payment_completed(&self.db, registration_id, payment_id).await?;
        info!(
            registration_id = %registration_id,
            user_id = %principal.id,
            "Payment recorded"
        );

        registrations::find_registration(&self.db, registration_id)
            .await?
            .ok_or(Error::RegistrationNotFound)
    }

    /// Admin-only removal of a registration
    pub async fn delete(&self, principal: &Principal, registration_id: Uuid) -> Result<()> {
        match principal.role {
            Role::Admin => {}
            Role::User | Role::Team => return Err(Error::ForbiddenRole { expected: "admin" }),
        }

        if !registrations::delete_registration(&self.db, registration_id).await? {
            return Err(Error::RegistrationNotFound);
        }

        info!(registration_id = %registration_id, admin_id = %principal.id, "Registration deleted");
        Ok(())
    }

    /// Registrations the principal is involved in, as leader or spot submitter
    pub async fn list_mine(&self, principal: &Principal) -> Result<Vec<Registration>> {
        registrations::list_for_user(&self.db, principal.id).await
    }
}
