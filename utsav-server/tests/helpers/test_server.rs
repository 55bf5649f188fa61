//! Test server wrapper for integration tests
//!
//! Provides an in-process router over a temporary on-disk database, plus
//! seeding helpers for events and accounts. On-disk (WAL) rather than
//! in-memory so concurrent submissions exercise the real unique indexes.

use std::sync::{Arc, Mutex};

use axum::async_trait;
use axum::http::StatusCode;
use axum::Router;
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use tempfile::TempDir;
use uuid::Uuid;

use utsav_common::api::{auth, Principal};
use utsav_common::db::init_database;
use utsav_common::db::models::{Event, Role};
use utsav_server::api::{build_router, AppContext};
use utsav_server::db::events::{self, NewEvent};
use utsav_server::db::users;
use utsav_server::mail::Mailer;
use utsav_server::registration::{LeaderDetails, SelfRegistrationRequest, SpotRegistrationRequest};
use utsav_server::RegistrationEngine;

/// Mailer that records recipients and fails on demand.
///
/// Recipients whose address starts with `fail` error out, which the bulk
/// loop must survive.
#[derive(Default, Clone)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        to: &str,
        _subject: &str,
        _html_body: &str,
    ) -> utsav_server::Result<()> {
        if to.starts_with("fail") {
            return Err(utsav_server::Error::Mail("simulated transport failure".to_string()));
        }
        self.sent.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

/// Test server instance with full router, engine, and database
pub struct TestServer {
    pub router: Router,
    pub db_pool: Pool<Sqlite>,
    pub engine: Arc<RegistrationEngine>,
    pub mailer: RecordingMailer,
    _data_dir: TempDir,
}

impl TestServer {
    /// Start a new test server over a fresh temporary database
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = tempfile::tempdir()?;
        let db_path = data_dir.path().join("utsav.db");
        let db_pool = init_database(&db_path).await?;

        let engine = Arc::new(RegistrationEngine::new(db_pool.clone()));
        let mailer = RecordingMailer::default();

        let ctx = AppContext {
            db_pool: db_pool.clone(),
            engine: Arc::clone(&engine),
            mailer: Arc::new(mailer.clone()),
        };
        let router = build_router(ctx);

        Ok(TestServer {
            router,
            db_pool,
            engine,
            mailer,
            _data_dir: data_dir,
        })
    }

    /// Make an HTTP request to the test server
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Option<Value>), Box<dyn std::error::Error>> {
        use axum::body::Body;
        use axum::http::{Method, Request};
        use tower::Service;

        let method = match method {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "DELETE" => Method::DELETE,
            "PUT" => Method::PUT,
            _ => return Err(format!("Unsupported method: {}", method).into()),
        };

        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            request_builder = request_builder.header("authorization", format!("Bearer {}", token));
        }
        if body.is_some() {
            request_builder = request_builder.header("content-type", "application/json");
        }

        let request = if let Some(json_body) = body {
            request_builder.body(Body::from(json_body.to_string()))?
        } else {
            request_builder.body(Body::empty())?
        };

        let response = self.router.clone().call(request).await?;
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json_body = if !bytes.is_empty() {
            Some(serde_json::from_slice(&bytes)?)
        } else {
            None
        };

        Ok((status, json_body))
    }

    /// Seed an event directly in the store
    pub async fn create_event(&self, new: &NewEvent) -> Event {
        events::insert_event(&self.db_pool, new)
            .await
            .expect("failed to seed event")
    }

    /// Create an account with the given role; returns the principal and a
    /// session token usable over HTTP
    pub async fn create_account(&self, role: Role) -> (Principal, String) {
        let tag = Uuid::new_v4().simple().to_string();
        let user = users::create_user(
            &self.db_pool,
            &format!("Account {}", &tag[..8]),
            &format!("{}@example.com", tag),
            &tag[..10].to_string(),
            "password123",
            role,
        )
        .await
        .expect("failed to seed account");

        let token = auth::create_session(&self.db_pool, user.guid)
            .await
            .expect("failed to create session");

        let principal = Principal {
            id: user.guid,
            role: user.role,
            name: user.name,
            email: user.email,
        };

        (principal, token)
    }
}

/// Event spec with sensible defaults for tests
pub fn event_spec(name: &str, fees: i64, category: &str, team_size: i64) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        fees,
        category: category.to_string(),
        team_size,
        min_team_size: None,
        max_team_size: None,
        is_variable_team_size: false,
        registration_open: true,
    }
}

/// Leader details with the given USN
pub fn leader(usn: &str) -> LeaderDetails {
    LeaderDetails {
        college_name: Some("Test College of Engineering".to_string()),
        usn: Some(usn.to_string()),
        name: Some("Participant".to_string()),
        email: None,
        mobile: None,
    }
}

/// Self-registration payload with the given participant USN and size
pub fn self_request(usn: &str, team_size: i64, team_name: Option<&str>) -> SelfRegistrationRequest {
    SelfRegistrationRequest {
        team_name: team_name.map(str::to_string),
        team_members: Vec::new(),
        team_size,
        team_leader_details: Some(leader(usn)),
        payment_id: None,
        order_id: None,
        transaction_id: None,
    }
}

/// Spot-registration payload with the given participant USN and size
pub fn spot_request(usn: &str, team_size: i64, team_name: Option<&str>) -> SpotRegistrationRequest {
    SpotRegistrationRequest {
        team_name: team_name.map(str::to_string),
        team_members: Vec::new(),
        team_size,
        team_leader_details: Some(leader(usn)),
        college_code: None,
        payment_status: None,
        payment_mode: None,
        payment_id: None,
        order_id: None,
        transaction_id: None,
        notes: None,
    }
}

/// Count stored registrations for an event
pub async fn count_registrations(db: &Pool<Sqlite>, event_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = ?")
        .bind(event_id)
        .fetch_one(db)
        .await
        .expect("count query failed")
}
