//! Stream producer
//!
//! ```rust,ignore
//! let producer = StreamProducer::from_stream_def::<BistroEvents>(redis);
//! let message_id = producer.send(&event).await?;
//! ```

use crate::error::StreamError;
use crate::registry::StreamDef;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::Serialize;
use tracing::debug;

/// Appends JSON jobs to a Redis stream.
#[derive(Clone)]
pub struct StreamProducer {
    redis: ConnectionManager,
    stream_name: String,
    max_length: i64,
}

impl StreamProducer {
    pub fn new(redis: ConnectionManager, stream_name: impl Into<String>, max_length: i64) -> Self {
        Self {
            redis,
            stream_name: stream_name.into(),
            max_length,
        }
    }

    pub fn from_stream_def<S: StreamDef>(redis: ConnectionManager) -> Self {
        Self::new(redis, S::STREAM_NAME, S::MAX_LENGTH)
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Enqueue a job, returning the stream entry id.
    pub async fn send<J: Serialize>(&self, job: &J) -> Result<String, StreamError> {
        let mut conn = self.redis.clone();
        let job_json = serde_json::to_string(job)?;

        let stream_id: String = redis::cmd("XADD")
            .arg(&self.stream_name)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*")
            .arg("job")
            .arg(&job_json)
            .query_async(&mut conn)
            .await?;

        debug!(stream = %self.stream_name, stream_id = %stream_id, "Enqueued job");
        Ok(stream_id)
    }

    pub async fn stream_length(&self) -> Result<i64, StreamError> {
        let mut conn = self.redis.clone();
        let len: i64 = conn.xlen(&self.stream_name).await?;
        Ok(len)
    }
}
