use thiserror::Error;

/// Stream processing errors
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A processor could not handle the job; the worker retries it.
    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

impl StreamError {
    pub fn processing(message: impl Into<String>) -> Self {
        StreamError::Processing(message.into())
    }

    /// Short label used for the `category` metric dimension.
    pub fn category(&self) -> &'static str {
        match self {
            StreamError::Redis(_) => "redis",
            StreamError::Serialization(_) => "serialization",
            StreamError::Processing(_) => "processing",
            StreamError::Metrics(_) => "metrics",
        }
    }
}
