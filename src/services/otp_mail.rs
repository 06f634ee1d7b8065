//! Delivery of login one-time passwords.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{self, MailConfig};

const OTP_PLACEHOLDER: &str = "{{otp}}";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("No SMTP host configured")]
    NotConfigured,

    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, recipient: &str, otp: &str) -> Result<(), MailError>;
}

/// Sends the rendered OTP template through an SMTP relay.
pub struct SmtpMailer {
    settings: MailConfig,
    host: String,
}

impl SmtpMailer {
    pub fn new(settings: MailConfig, host: String) -> Self {
        Self { settings, host }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let builder = if self.settings.enable_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
        };

        let mut builder = builder.port(self.settings.smtp_port);
        if let Some(password) = &self.settings.smtp_password {
            // The sender address doubles as the login unless a username is configured
            let username = self
                .settings
                .smtp_username
                .clone()
                .unwrap_or_else(|| self.settings.sender_email.clone());
            builder = builder.credentials(Credentials::new(username, password.clone()));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl OtpMailer for SmtpMailer {
    async fn send_otp(&self, recipient: &str, otp: &str) -> Result<(), MailError> {
        info!("Sending OTP email to {}", recipient);

        let body = render_body(&self.settings.template_path, otp).await;
        let from = Mailbox::new(
            Some(self.settings.sender_name.clone()),
            self.settings.sender_email.parse()?,
        );
        let message = Message::builder()
            .from(from)
            .to(Mailbox::new(None, recipient.trim().parse()?))
            .subject(self.settings.otp_subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.transport()?.send(message).await?;
        info!("OTP email sent to {}", recipient);
        Ok(())
    }
}

/// Used when no SMTP host is configured.
pub struct LogMailer {
    development: bool,
}

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(&self, recipient: &str, otp: &str) -> Result<(), MailError> {
        if !self.development {
            return Err(MailError::NotConfigured);
        }
        info!("SMTP not configured; OTP for {} is {}", recipient, otp);
        Ok(())
    }
}

pub fn mailer_for(settings: &MailConfig, development: bool) -> Arc<dyn OtpMailer> {
    match &settings.smtp_host {
        Some(host) => Arc::new(SmtpMailer::new(settings.clone(), host.clone())),
        None => Arc::new(LogMailer { development }),
    }
}

static MAILER: Lazy<Arc<dyn OtpMailer>> =
    Lazy::new(|| mailer_for(&config::config().mail, crate::is_development!()));

/// The process-wide mailer chosen from configuration.
pub fn mailer() -> Arc<dyn OtpMailer> {
    MAILER.clone()
}

async fn render_body(template_path: &str, otp: &str) -> String {
    match tokio::fs::read_to_string(template_path).await {
        Ok(template) => fill_template(&template, otp),
        Err(e) => {
            warn!("OTP email template {} unavailable ({}), using fallback", template_path, e);
            fallback_body(otp)
        }
    }
}

pub fn fill_template(template: &str, otp: &str) -> String {
    template.replace(OTP_PLACEHOLDER, otp)
}

pub fn fallback_body(otp: &str) -> String {
    format!(
        "<!DOCTYPE html>\
<html lang=\"en\"><head><meta charset=\"UTF-8\"><title>Login verification</title></head>\
<body style=\"font-family: Arial, sans-serif; background: #f8f9fa; padding: 32px;\">\
<div style=\"max-width: 520px; margin: 0 auto; background: #ffffff; border-radius: 8px; padding: 32px; text-align: center;\">\
<h2 style=\"color: #1f2937;\">Your verification code</h2>\
<p style=\"color: #6b7280;\">Use this one-time password to complete your login:</p>\
<div style=\"font-size: 36px; font-weight: bold; letter-spacing: 8px; color: #0369a1; margin: 24px 0;\">{otp}</div>\
<p style=\"color: #92400e; font-size: 13px;\">The code is valid for 10 minutes and can be used once. Never share it.</p>\
<p style=\"color: #9ca3af; font-size: 12px;\">If you did not request this code, ignore this email.</p>\
</div></body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(host: Option<&str>) -> MailConfig {
        MailConfig {
            smtp_host: host.map(str::to_string),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            enable_tls: true,
            sender_email: "noreply@example.com".to_string(),
            sender_name: "Projects".to_string(),
            otp_subject: "Your OTP".to_string(),
            template_path: "does/not/exist.html".to_string(),
        }
    }

    #[test]
    fn fills_every_placeholder() {
        let html = fill_template("<b>{{otp}}</b> again {{otp}}", "482913");
        assert_eq!(html, "<b>482913</b> again 482913");
    }

    #[test]
    fn fallback_contains_code() {
        assert!(fallback_body("123456").contains(">123456<"));
    }

    #[tokio::test]
    async fn missing_template_uses_fallback() {
        let body = render_body("does/not/exist.html", "654321").await;
        assert!(body.contains("654321"));
        assert!(body.starts_with("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn shipped_template_has_placeholder() {
        let body = render_body("templates/otp_email.html", "777111").await;
        assert!(body.contains("777111"));
        assert!(!body.contains(OTP_PLACEHOLDER));
    }

    #[tokio::test]
    async fn log_mailer_only_delivers_in_development() {
        let dev = mailer_for(&settings(None), true);
        assert!(dev.send_otp("a@b.c", "111222").await.is_ok());

        let prod = mailer_for(&settings(None), false);
        assert!(matches!(
            prod.send_otp("a@b.c", "111222").await,
            Err(MailError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn bad_recipient_fails_before_connecting() {
        let smtp = mailer_for(&settings(Some("smtp.invalid")), false);
        assert!(matches!(
            smtp.send_otp("not an address", "111222").await,
            Err(MailError::Address(_))
        ));
    }
}
