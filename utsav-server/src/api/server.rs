//! HTTP router setup
//!
//! Builds the axum router over a shared application context. Binding and
//! serving happen in `main.rs`; tests drive the router in-process.

use crate::mail::Mailer;
use crate::registration::RegistrationEngine;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application context passed to all handlers
///
/// **Note:** AppContext implements Clone, which gives us `FromRef<AppContext>`
/// for free via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    pub db_pool: Pool<Sqlite>,
    pub engine: Arc<RegistrationEngine>,
    pub mailer: Arc<dyn Mailer>,
}

/// Build the application router with all routes
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))

        // Account endpoints
        .route("/auth/signup", post(super::handlers::signup))
        .route("/auth/login", post(super::handlers::login))

        // Registration submission and lookup
        .route("/events/:event_id/register", post(super::handlers::register_for_event))
        .route("/events/:event_id/spot-register", post(super::handlers::spot_register))
        .route("/events/:event_id/registration", get(super::handlers::check_registration))
        .route("/registrations/mine", get(super::handlers::my_registrations))
        .route("/registrations/:registration_id/payment", put(super::handlers::update_payment))

        // Admin operations
        .route("/admin/registrations", get(super::handlers::admin_list_registrations))
        .route(
            "/admin/registrations/:registration_id",
            delete(super::handlers::admin_delete_registration),
        )
        .route(
            "/admin/events/:event_id/toggle-registration",
            post(super::handlers::admin_toggle_registration),
        )
        .route(
            "/admin/events/:event_id/notify",
            post(super::handlers::admin_notify_registrants),
        )

        // Attach application context
        .with_state(ctx)

        // Request tracing and CORS for local clients
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
