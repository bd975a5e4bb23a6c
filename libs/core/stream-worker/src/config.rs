//! Worker configuration

use crate::registry::StreamDef;
use uuid::Uuid;

/// Configuration for a [`StreamWorker`](crate::StreamWorker)
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub stream_name: String,

    pub consumer_group: String,

    /// Unique consumer name inside the group
    pub consumer_id: String,

    pub dlq_stream: String,

    /// Failed jobs are re-enqueued here, read only by this group
    pub retry_stream: String,

    /// MAXLEN used when re-enqueueing failed jobs
    pub max_length: i64,

    /// Messages fetched per XREADGROUP call
    pub batch_size: usize,

    /// BLOCK timeout of XREADGROUP; also bounds how long shutdown takes
    pub block_timeout_ms: u64,

    /// Pause after a Redis error before reading again
    pub error_pause_ms: u64,

    /// Failures tolerated before a job is dead-lettered
    pub max_retries: u32,
}

impl WorkerConfig {
    /// Worker for the stream `S`, reading through `consumer_group`.
    pub fn from_stream_def<S: StreamDef>(consumer_group: impl Into<String>) -> Self {
        let consumer_group = consumer_group.into();
        Self {
            stream_name: S::STREAM_NAME.to_string(),
            consumer_id: format!("{}-{}", consumer_group, Uuid::new_v4()),
            retry_stream: retry_stream_name(S::STREAM_NAME, &consumer_group),
            consumer_group,
            dlq_stream: S::DLQ_STREAM.to_string(),
            max_length: S::MAX_LENGTH,
            batch_size: 10,
            block_timeout_ms: 2_000,
            error_pause_ms: 1_000,
            max_retries: 3,
        }
    }

    /// Both streams this group reads: the shared one first, then its retries.
    pub fn streams(&self) -> [&str; 2] {
        [self.stream_name.as_str(), self.retry_stream.as_str()]
    }

    pub fn with_consumer_id(mut self, id: impl Into<String>) -> Self {
        self.consumer_id = id.into();
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_block_timeout_ms(mut self, timeout: u64) -> Self {
        self.block_timeout_ms = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

pub fn retry_stream_name(stream: &str, consumer_group: &str) -> String {
    format!("{}:retry:{}", stream, consumer_group)
}
