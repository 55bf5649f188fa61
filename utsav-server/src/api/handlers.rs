//! HTTP request handlers
//!
//! REST endpoints over the registration admission engine. Every error path
//! funnels through `error_response`, which maps the admission taxonomy to a
//! status code and a machine-readable JSON body.

use crate::api::server::AppContext;
use crate::db;
use crate::mail;
use crate::registration::engine::RegistrationCheck;
use crate::registration::{SelfRegistrationRequest, SpotRegistrationRequest};
use crate::Error;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utsav_common::api::{auth, ErrorBody, Principal};
use utsav_common::db::models::{PaymentStatus, Registration, Role, User};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_id: String,
}

#[derive(Debug, Serialize)]
pub struct SpotRegistrationResponse {
    pub message: String,
    pub registration: Registration,
    pub payment_required: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleRegistrationResponse {
    pub message: String,
    pub registration_open: bool,
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub message: String,
    pub sent: usize,
}

/// Display identity of the actual participant, attached to spot records
#[derive(Debug, Serialize)]
pub struct DisplayLeader {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub usn: String,
}

/// A registration plus channel display information
#[derive(Debug, Serialize)]
pub struct RegistrationView {
    #[serde(flatten)]
    pub registration: Registration,
    pub is_spot_registration: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_team_leader: Option<DisplayLeader>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationFilterQuery {
    pub event_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map an admission error to its HTTP status and structured body
pub(crate) fn error_response(err: Error) -> (StatusCode, Json<ErrorBody>) {
    let message = err.to_string();

    match err {
        Error::ForbiddenRole { .. } | Error::Forbidden => {
            (StatusCode::FORBIDDEN, Json(ErrorBody::message(message)))
        }
        Error::RegistrationClosed => {
            let mut body = ErrorBody::message(message);
            body.registration_closed = Some(true);
            (StatusCode::FORBIDDEN, Json(body))
        }
        Error::EventNotFound | Error::RegistrationNotFound => {
            (StatusCode::NOT_FOUND, Json(ErrorBody::message(message)))
        }
        Error::TeamSizeTooSmall { .. }
        | Error::TeamSizeTooLarge { .. }
        | Error::TeamSizeMismatch { .. }
        | Error::TeamNameRequired
        | Error::LeaderDetailsRequired => {
            (StatusCode::BAD_REQUEST, Json(ErrorBody::message(message)))
        }
        Error::AlreadyRegistered { registration_id, registered_at } => {
            let mut body = ErrorBody::message(message);
            body.already_registered = Some(true);
            body.registration_id = registration_id;
            body.registration_date = registered_at;
            (StatusCode::CONFLICT, Json(body))
        }
        Error::DuplicateTeam { .. } | Error::DuplicateParticipant { .. } => {
            (StatusCode::CONFLICT, Json(ErrorBody::message(message)))
        }
        Error::Validation(details) => {
            let mut body = ErrorBody::message("Validation failed");
            body.details = Some(details);
            (StatusCode::BAD_REQUEST, Json(body))
        }
        Error::Mail(_) | Error::Database(_) | Error::Common(_) => {
            error!("Internal error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::message("Internal server error")),
            )
        }
    }
}

fn require_admin(principal: &Principal) -> Result<(), (StatusCode, Json<ErrorBody>)> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::User | Role::Team => {
            Err(error_response(Error::ForbiddenRole { expected: "admin" }))
        }
    }
}

fn to_view(reg: Registration) -> RegistrationView {
    let is_spot = reg.is_spot_registration();
    let display_team_leader = if is_spot {
        Some(DisplayLeader {
            name: reg.leader_name.clone().unwrap_or_else(|| "Unknown Participant".to_string()),
            email: reg.leader_email.clone().unwrap_or_else(|| "N/A".to_string()),
            mobile: reg.leader_mobile.clone().unwrap_or_else(|| "N/A".to_string()),
            usn: reg.leader_usn.clone(),
        })
    } else {
        None
    };

    RegistrationView {
        registration: reg,
        is_spot_registration: is_spot,
        display_team_leader,
    }
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "registration_server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Account Endpoints
// ============================================================================

/// POST /auth/signup - Create an end-user account and mint a session
///
/// Public signup always creates the `user` role; team and admin accounts are
/// provisioned operationally.
pub async fn signup(
    State(ctx): State<AppContext>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ErrorBody>)> {
    let mut missing = Vec::new();
    if req.name.trim().is_empty() {
        missing.push("name is required".to_string());
    }
    if req.email.trim().is_empty() {
        missing.push("email is required".to_string());
    }
    if req.mobile.trim().is_empty() {
        missing.push("mobile is required".to_string());
    }
    if req.password.is_empty() {
        missing.push("password is required".to_string());
    }
    if !missing.is_empty() {
        return Err(error_response(Error::Validation(missing)));
    }

    let user = db::users::create_user(
        &ctx.db_pool,
        req.name.trim(),
        req.email.trim(),
        req.mobile.trim(),
        &req.password,
        Role::User,
    )
    .await
    .map_err(error_response)?;

    let token = auth::create_session(&ctx.db_pool, user.guid)
        .await
        .map_err(|e| error_response(Error::Common(e)))?;

    info!(user_id = %user.guid, "Account created");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /auth/login - Verify credentials and mint a session token
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorBody>)> {
    let user = db::users::verify_credentials(&ctx.db_pool, req.email.trim(), &req.password)
        .await
        .map_err(error_response)?;

    let Some(user) = user else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::message("Invalid email or password")),
        ));
    };

    let token = auth::create_session(&ctx.db_pool, user.guid)
        .await
        .map_err(|e| error_response(Error::Common(e)))?;

    Ok(Json(AuthResponse { token, user }))
}

// ============================================================================
// Registration Endpoints
// ============================================================================

/// POST /events/:event_id/register - Self-service registration
pub async fn register_for_event(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(event_id): Path<Uuid>,
    Json(req): Json<SelfRegistrationRequest>,
) -> Result<(StatusCode, Json<Registration>), (StatusCode, Json<ErrorBody>)> {
    match ctx.engine.submit_self(&principal, event_id, req).await {
        Ok(registration) => Ok((StatusCode::CREATED, Json(registration))),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /events/:event_id/spot-register - Venue registration by a team member
pub async fn spot_register(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(event_id): Path<Uuid>,
    Json(req): Json<SpotRegistrationRequest>,
) -> Result<(StatusCode, Json<SpotRegistrationResponse>), (StatusCode, Json<ErrorBody>)> {
    match ctx.engine.submit_spot(&principal, event_id, req).await {
        Ok(registration) => {
            let payment_required = registration.payment_status == PaymentStatus::Pending;
            Ok((
                StatusCode::CREATED,
                Json(SpotRegistrationResponse {
                    message: "Spot registration completed successfully".to_string(),
                    registration,
                    payment_required,
                }),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// GET /events/:event_id/registration - Is the caller already registered?
pub async fn check_registration(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(event_id): Path<Uuid>,
) -> Result<Json<RegistrationCheck>, (StatusCode, Json<ErrorBody>)> {
    match ctx.engine.check_existing(&principal, event_id).await {
        Ok(check) => Ok(Json(check)),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /registrations/mine - Registrations the caller is involved in
pub async fn my_registrations(
    State(ctx): State<AppContext>,
    principal: Principal,
) -> Result<Json<Vec<RegistrationView>>, (StatusCode, Json<ErrorBody>)> {
    match ctx.engine.list_mine(&principal).await {
        Ok(registrations) => Ok(Json(registrations.into_iter().map(to_view).collect())),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /registrations/:registration_id/payment - Record a completed payment
pub async fn update_payment(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(registration_id): Path<Uuid>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<Json<Registration>, (StatusCode, Json<ErrorBody>)> {
    match ctx
        .engine
        .update_payment(&principal, registration_id, &req.payment_id)
        .await
    {
        Ok(registration) => Ok(Json(registration)),
        Err(e) => Err(error_response(e)),
    }
}

// ============================================================================
// Admin Endpoints
// ============================================================================

/// GET /admin/registrations - List registrations with optional filters
pub async fn admin_list_registrations(
    State(ctx): State<AppContext>,
    principal: Principal,
    Query(query): Query<RegistrationFilterQuery>,
) -> Result<Json<Vec<RegistrationView>>, (StatusCode, Json<ErrorBody>)> {
    require_admin(&principal)?;

    let filter = db::registrations::RegistrationFilter {
        event_id: query.event_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    match db::registrations::list_all(&ctx.db_pool, &filter).await {
        Ok(registrations) => Ok(Json(registrations.into_iter().map(to_view).collect())),
        Err(e) => Err(error_response(e)),
    }
}

/// DELETE /admin/registrations/:registration_id - Remove a registration
pub async fn admin_delete_registration(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorBody>)> {
    match ctx.engine.delete(&principal, registration_id).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: format!("Registration {} deleted successfully", registration_id),
        })),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /admin/events/:event_id/toggle-registration - Open or close entries
pub async fn admin_toggle_registration(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ToggleRegistrationResponse>, (StatusCode, Json<ErrorBody>)> {
    require_admin(&principal)?;

    let event = db::events::find_event(&ctx.db_pool, event_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(Error::EventNotFound))?;

    let open = !event.registration_open;
    db::events::set_registration_open(&ctx.db_pool, event_id, open)
        .await
        .map_err(error_response)?;

    info!(event_id = %event_id, registration_open = open, "Registration toggled");
    Ok(Json(ToggleRegistrationResponse {
        message: format!(
            "Registration for event \"{}\" is now {}",
            event.name,
            if open { "open" } else { "closed" }
        ),
        registration_open: open,
    }))
}

/// POST /admin/events/:event_id/notify - Send bulk confirmation emails
///
/// Best-effort sequential loop; a failed send is logged and skipped.
pub async fn admin_notify_registrants(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(event_id): Path<Uuid>,
) -> Result<Json<NotifyResponse>, (StatusCode, Json<ErrorBody>)> {
    require_admin(&principal)?;

    let event = db::events::find_event(&ctx.db_pool, event_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(Error::EventNotFound))?;

    let registrations = db::registrations::list_for_event(&ctx.db_pool, event_id)
        .await
        .map_err(error_response)?;

    let sent = mail::send_bulk_confirmations(ctx.mailer.as_ref(), &event, &registrations).await;

    Ok(Json(NotifyResponse {
        message: format!("Emails sent to {} team leaders.", sent),
        sent,
    }))
}
