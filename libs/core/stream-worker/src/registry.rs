//! Stream definitions and the job/processor traits.

use crate::error::StreamError;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// Names a Redis stream and its dead letter stream.
///
/// Consumer groups are not part of the definition: every consuming service
/// reads the same stream through its own group.
///
/// ```rust,ignore
/// pub struct BistroEvents;
///
/// impl StreamDef for BistroEvents {
///     const STREAM_NAME: &'static str = "bistro:events";
///     const DLQ_STREAM: &'static str = "bistro:events:dlq";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    const STREAM_NAME: &'static str;

    const DLQ_STREAM: &'static str;

    /// Approximate MAXLEN applied on every XADD.
    const MAX_LENGTH: i64 = 100_000;
}

/// A job payload carried in the `job` field of a stream entry.
pub trait StreamJob: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Identifier used in logs and DLQ entries.
    fn job_id(&self) -> String;

    fn retry_count(&self) -> u32;

    /// Copy of the job with `retry_count + 1`.
    fn with_retry(&self) -> Self;
}

/// Handles jobs read from a stream.
///
/// Returning `Err` makes the worker re-enqueue the job, or dead-letter it
/// once the retry limit is reached. Jobs a processor chooses to ignore
/// should return `Ok(())`.
#[async_trait]
pub trait StreamProcessor<J: StreamJob>: Send + Sync {
    async fn process(&self, job: &J) -> Result<(), StreamError>;

    /// Name used in logs and metric labels.
    fn name(&self) -> &'static str;
}
