//! Bearer-token principal extraction
//!
//! Handlers declare a `Principal` parameter to require authentication; the
//! extractor resolves the Authorization header against the sessions table.
//! Role gating happens in the handlers and, for the two submission
//! endpoints, redundantly inside the engine.

use crate::api::server::AppContext;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use utsav_common::api::{auth, ErrorBody, Principal};

#[async_trait]
impl FromRequestParts<AppContext> for Principal {
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorBody::message("Authentication required")),
                )
            })?;

        match auth::authenticate_token(&ctx.db_pool, token).await {
            Ok(Some(principal)) => Ok(principal),
            Ok(None) => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::message("Invalid or expired session")),
            )),
            Err(e) => {
                tracing::error!("Session lookup failed: {}", e);
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::message("Internal server error")),
                ))
            }
        }
    }
}
