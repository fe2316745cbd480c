//! Outbound email over SMTP.
//!
//! With no `mail.smtp_host` configured the mailer runs in log-only mode:
//! messages are rendered and written to the log instead of being sent.

use anyhow::{Context, Result};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use staynest_common::config::MailConfig;

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
pub struct Mailer {
    from: Mailbox,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    pub fn from_config(cfg: &MailConfig) -> Result<Self> {
        let from: Mailbox = cfg
            .from
            .parse()
            .with_context(|| format!("Invalid mail.from address '{}'", cfg.from))?;

        if cfg.smtp_host.trim().is_empty() {
            tracing::warn!("mail.smtp_host is empty; emails will be logged, not sent");
            return Ok(Self { from, transport: None });
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
            .with_context(|| format!("Invalid SMTP relay '{}'", cfg.smtp_host))?
            .port(cfg.smtp_port);
        if !cfg.username.is_empty() {
            builder = builder.credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()));
        }

        Ok(Self {
            from,
            transport: Some(builder.build()),
        })
    }

    /// Log-only mailer, for tests and local development.
    pub fn log_only(from: Mailbox) -> Self {
        Self { from, transport: None }
    }

    pub async fn send(&self, email: Email) -> Result<()> {
        let Some(transport) = &self.transport else {
            tracing::info!(to = %email.to, subject = %email.subject, body = %email.body, "Email (log-only)");
            return Ok(());
        };

        let to: Mailbox = email
            .to
            .parse()
            .with_context(|| format!("Invalid recipient '{}'", email.to))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .context("Failed to build email")?;

        transport.send(message).await.context("SMTP send failed")?;
        tracing::debug!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }

    /// Send without failing the caller; errors are logged.
    pub async fn send_best_effort(&self, email: Email) {
        let to = email.to.clone();
        if let Err(e) = self.send(email).await {
            tracing::warn!(to = %to, "Email delivery failed: {e:#}");
        }
    }
}

// ── Templates ─────────────────────────────────────────────────────────────────

pub fn password_reset_email(to: &str, first_name: &str, link: &str, ttl_minutes: u64) -> Email {
    Email {
        to: to.to_string(),
        subject: "Reset your StayNest password".to_string(),
        body: format!(
            "Hi {first_name},\n\n\
             We received a request to reset your password. Open the link below to choose a new one:\n\n\
             {link}\n\n\
             The link expires in {ttl_minutes} minutes. If you didn't ask for this, you can ignore this email.\n\n\
             The StayNest team"
        ),
    }
}

pub fn contact_notification_email(
    to: &str,
    name: &str,
    email: &str,
    subject: Option<&str>,
    message: &str,
) -> Email {
    Email {
        to: to.to_string(),
        subject: format!("[Contact] {}", subject.unwrap_or("New message")),
        body: format!("From: {name} <{email}>\n\n{message}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_email_contains_link_and_expiry() {
        let email = password_reset_email(
            "ada@example.com",
            "Ada",
            "http://localhost:3000/reset-password/abc",
            60,
        );
        assert_eq!(email.to, "ada@example.com");
        assert!(email.body.contains("http://localhost:3000/reset-password/abc"));
        assert!(email.body.contains("60 minutes"));
    }

    #[test]
    fn contact_subject_falls_back() {
        let email = contact_notification_email("ops@example.com", "Bob", "bob@example.com", None, "Hi");
        assert_eq!(email.subject, "[Contact] New message");
        assert!(email.body.starts_with("From: Bob <bob@example.com>"));
    }

    #[tokio::test]
    async fn log_only_mailer_accepts_mail() {
        let mailer = Mailer::log_only("StayNest <no-reply@staynest.local>".parse().unwrap());
        let email = contact_notification_email("ops@example.com", "Bob", "bob@example.com", Some("Hello"), "Hi");
        assert!(mailer.send(email).await.is_ok());
    }
}
