//! Email delivery for admin bulk notifications
//!
//! The bulk confirmation loop is best-effort and sequential: a failed send
//! is logged and never aborts the batch. No retries, no queue.

use crate::{Error, Result};
use axum::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};
use utsav_common::categories::category_label;
use utsav_common::db::models::{Event, Registration};

/// Email delivery seam; the server takes whichever implementation the
/// deployment provides.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

/// SMTP mailer for production use
pub struct SmtpMailer {
    server: String,
    port: u16,
    credentials: Credentials,
    from: String,
}

impl SmtpMailer {
    pub fn new(server: String, port: u16, username: String, password: String, from: String) -> Self {
        Self {
            server,
            port,
            credentials: Credentials::new(username, password),
            from,
        }
    }

    /// Build an SMTP mailer from environment variables, or None when the
    /// deployment carries no SMTP configuration.
    ///
    /// Reads `UTSAV_SMTP_SERVER`, `UTSAV_SMTP_PORT` (default 587),
    /// `UTSAV_SMTP_USERNAME`, `UTSAV_SMTP_PASSWORD`, `UTSAV_MAIL_FROM`.
    pub fn from_env() -> Option<Self> {
        let server = std::env::var("UTSAV_SMTP_SERVER").ok()?;
        let username = std::env::var("UTSAV_SMTP_USERNAME").ok()?;
        let password = std::env::var("UTSAV_SMTP_PASSWORD").ok()?;
        let from = std::env::var("UTSAV_MAIL_FROM")
            .ok()
            .unwrap_or_else(|| format!("Utsav Admin <{}>", username));
        let port = std::env::var("UTSAV_SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);

        Some(Self::new(server, port, username, password, from))
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&self.server)
            .map_err(|e| Error::Mail(format!("SMTP relay error: {e}")))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| Error::Mail(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| Error::Mail(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| Error::Mail(format!("Failed to build email: {e}")))?;

        let transport = self.build_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| Error::Mail(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

/// Log-only mailer for deployments without SMTP and for tests
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<()> {
        info!("[mail] to={} subject={}", to, subject);
        Ok(())
    }
}

/// Send confirmation emails to every registration carrying a leader email.
///
/// Returns the number of successful sends. Failures are logged and skipped;
/// the batch always runs to completion.
pub async fn send_bulk_confirmations(
    mailer: &dyn Mailer,
    event: &Event,
    registrations: &[Registration],
) -> usize {
    let mut sent = 0;

    for reg in registrations {
        let Some(to) = reg.leader_email.as_deref() else {
            continue;
        };
        let leader_name = reg.leader_name.as_deref().unwrap_or("Team Leader");
        let subject = format!("Registration Confirmation for {}", event.name);
        let body = confirmation_body(event, leader_name, reg);

        match mailer.send(to, &subject, &body).await {
            Ok(()) => sent += 1,
            Err(e) => warn!(
                registration_id = %reg.guid,
                "Failed to send confirmation to {}: {}",
                to, e
            ),
        }
    }

    sent
}

fn confirmation_body(event: &Event, leader_name: &str, reg: &Registration) -> String {
    let team_name = reg.team_name.as_deref().unwrap_or("N/A");

    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; color: #333;">
    <h2>Hello {leader_name},</h2>
    <p>Thank you for registering for <strong>{event_name}</strong> ({category})!</p>
    <p><strong>Team Name:</strong> {team_name}<br/>
       <strong>Team Size:</strong> {team_size}</p>
    <p>Stay tuned for further updates and instructions related to the event.</p>
    <p>Warm regards,<br/><strong>The {event_name} Team</strong></p>
  </body>
</html>"#,
        leader_name = leader_name,
        event_name = event.name,
        category = category_label(&event.category),
        team_name = team_name,
        team_size = reg.team_size,
    )
}
