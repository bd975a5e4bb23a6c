//! Mock email provider for tests and local development

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Captures sent emails instead of delivering them.
///
/// Clones share the same mailbox, so a test can keep one handle while the
/// processor owns another.
#[derive(Clone, Default)]
pub struct MockEmailProvider {
    sent_emails: Arc<Mutex<Vec<Email>>>,
    failure_message: Option<String>,
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every send fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent_emails: Arc::default(),
            failure_message: Some(message.into()),
        }
    }

    pub async fn sent_emails(&self) -> Vec<Email> {
        self.sent_emails.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to == address)
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        if let Some(message) = &self.failure_message {
            return Err(eyre::eyre!("{}", message));
        }

        tracing::debug!(email_id = %email.id, to = %email.to, subject = %email.subject, "Captured email");
        self.sent_emails.lock().await.push(email.clone());

        Ok(SendResult {
            message_id: format!("mock-{}", email.id),
        })
    }

    async fn health_check(&self) -> Result<()> {
        if self.failure_message.is_some() {
            return Err(eyre::eyre!("Mock health check failed"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
