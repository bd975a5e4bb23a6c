//! Email provider implementations

pub mod mock;
pub mod smtp;

pub use mock::MockEmailProvider;
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;

/// Result of sending an email
#[derive(Debug)]
pub struct SendResult {
    /// Provider-specific message ID
    pub message_id: String,
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &Email) -> Result<SendResult>;

    async fn health_check(&self) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Lets the worker pick a provider at startup and hand it around as a trait object.
#[async_trait]
impl<P: EmailProvider + ?Sized> EmailProvider for Box<P> {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        (**self).send(email).await
    }

    async fn health_check(&self) -> Result<()> {
        (**self).health_check().await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
