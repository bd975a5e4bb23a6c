//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};
use eyre::{Result, WrapErr};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// SMTP provider configuration
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    /// STARTTLS relay with credentials; off for Mailpit-style local servers
    pub use_tls: bool,
}

impl FromEnv for SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_required("SMTP_HOST")?,
            port: env_parse("SMTP_PORT", 587)?,
            username: env_or_default("SMTP_USERNAME", ""),
            password: env_or_default("SMTP_PASSWORD", ""),
            from_email: env_or_default("EMAIL_FROM_ADDRESS", "noreply@bistro.local"),
            from_name: env_or_default("EMAIL_FROM_NAME", "Bistro"),
            use_tls: env_parse("SMTP_USE_TLS", true)?,
        })
    }
}

pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let transport = if config.use_tls {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .wrap_err("Failed to create SMTP relay")?
                .credentials(creds)
                .port(config.port)
                .build()
        } else if !config.username.is_empty() {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .credentials(creds)
                .port(config.port)
                .build()
        } else {
            // No auth (Mailpit/Mailhog)
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .build()
        };

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .wrap_err("Invalid from address")?;

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: &Email) -> Result<Message> {
        let to: Mailbox = match &email.to_name {
            Some(name) => format!("{} <{}>", name, email.to).parse::<Mailbox>(),
            None => email.to.parse::<Mailbox>(),
        }
        .wrap_err("Invalid to address")?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject);

        if let Some(reply_to) = &email.reply_to {
            let reply_to: Mailbox = reply_to.parse().wrap_err("Invalid reply-to address")?;
            builder = builder.reply_to(reply_to);
        }

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .wrap_err("Failed to build text message")?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .wrap_err("Failed to build HTML message")?,
            (None, None) => {
                return Err(eyre::eyre!("Email must have either text or HTML body"));
            }
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.to_string());

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email sent via SMTP"
        );

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> Result<()> {
        let connected = self
            .transport
            .test_connection()
            .await
            .wrap_err("SMTP health check failed")?;
        if !connected {
            return Err(eyre::eyre!("SMTP server refused the connection"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
