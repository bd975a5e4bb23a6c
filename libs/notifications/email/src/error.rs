//! Error types for the notification pipeline.

use core_config::ConfigError;
use stream_worker::StreamError;
use thiserror::Error;

pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Template error: {0}")]
    Template(String),

    /// SMTP or mock provider failure
    #[error("Provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<eyre::Report> for NotificationError {
    fn from(err: eyre::Report) -> Self {
        Self::Provider(format!("{:#}", err))
    }
}

/// Every notification failure is retried by the worker, then dead-lettered.
impl From<NotificationError> for StreamError {
    fn from(err: NotificationError) -> Self {
        StreamError::processing(err.to_string())
    }
}
