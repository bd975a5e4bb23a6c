//! The consumer-group worker loop.

use crate::config::WorkerConfig;
use crate::consumer::{StreamConsumer, StreamMessage};
use crate::dlq::DlqManager;
use crate::error::StreamError;
use crate::metrics::StreamMetrics;
use crate::producer::StreamProducer;
use crate::registry::{StreamJob, StreamProcessor};
use redis::aio::ConnectionManager;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What happens to a job after one processing attempt.
#[derive(Debug, PartialEq)]
pub enum Outcome<J> {
    /// Processed; acknowledge only.
    Done,
    /// Failed; append this copy (retry count bumped) to the group's retry
    /// stream and acknowledge the original.
    Retry(J),
    /// Failed for the last time; dead-letter with this error.
    DeadLetter(String),
}

/// Retry policy: a job is dead-lettered on its `max_retries`-th failure.
pub fn decide<J: StreamJob>(
    job: &J,
    result: Result<(), StreamError>,
    max_retries: u32,
) -> Outcome<J> {
    match result {
        Ok(()) => Outcome::Done,
        Err(e) if job.retry_count() + 1 >= max_retries => Outcome::DeadLetter(e.to_string()),
        Err(_) => Outcome::Retry(job.with_retry()),
    }
}

/// Reads a consumer group and feeds every job to a [`StreamProcessor`].
///
/// Each entry is acknowledged exactly once, after its outcome is durable:
/// processed, re-enqueued, or written to the DLQ. Retries go to the group's
/// own retry stream, so other groups on the shared stream never see them.
/// Entries without a parseable `job` field are acknowledged and dropped.
pub struct StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    consumer: StreamConsumer,
    producer: StreamProducer,
    dlq: DlqManager,
    processor: Arc<P>,
    metrics: StreamMetrics,
    config: WorkerConfig,
    _phantom: PhantomData<J>,
}

impl<J, P> StreamWorker<J, P>
where
    J: StreamJob + 'static,
    P: StreamProcessor<J> + 'static,
{
    pub fn new(redis: ConnectionManager, processor: Arc<P>, config: WorkerConfig) -> Self {
        Self {
            consumer: StreamConsumer::new(redis.clone(), config.clone()),
            producer: StreamProducer::new(
                redis.clone(),
                config.retry_stream.clone(),
                config.max_length,
            ),
            dlq: DlqManager::new(redis, config.dlq_stream.clone()),
            metrics: StreamMetrics::new(config.stream_name.clone(), processor.name()),
            processor,
            config,
            _phantom: PhantomData,
        }
    }

    /// Run until `shutdown` flips to `true`.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<(), StreamError> {
        info!(
            consumer_id = %self.config.consumer_id,
            stream = %self.config.stream_name,
            group = %self.config.consumer_group,
            processor = %self.processor.name(),
            "Starting stream worker"
        );

        self.consumer.init_consumer_group().await?;

        match self.consumer.read_pending().await {
            Ok(pending) => {
                if !pending.is_empty() {
                    info!(count = pending.len(), "Recovering pending messages");
                }
                for message in pending {
                    self.handle_message(message).await;
                }
            }
            Err(e) => warn!(error = %e, "Failed to read pending messages"),
        }

        let error_pause = Duration::from_millis(self.config.error_pause_ms);

        while !*shutdown.borrow() {
            match self.consumer.read_new().await {
                Ok(messages) => {
                    for message in messages {
                        self.handle_message(message).await;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to read from stream");
                    if e.to_string().contains("NOGROUP")
                        && let Err(e) = self.consumer.init_consumer_group().await
                    {
                        error!(error = %e, "Failed to recreate consumer group");
                    }
                    tokio::time::sleep(error_pause).await;
                }
            }
        }

        info!("Stream worker stopped");
        Ok(())
    }

    /// Process one entry and acknowledge it once its outcome is recorded.
    pub async fn handle_message(&self, message: StreamMessage) {
        let Some(job) = self.parse(&message) else {
            self.metrics.job_failed("parse");
            self.ack(&message).await;
            return;
        };

        self.metrics.job_received();
        debug!(message_id = %message.id, job_id = %job.job_id(), "Processing job");

        let started = Instant::now();
        let result = self.processor.process(&job).await;
        if let Err(e) = &result {
            warn!(
                message_id = %message.id,
                job_id = %job.job_id(),
                retry_count = job.retry_count(),
                error = %e,
                "Job failed"
            );
            self.metrics.job_failed(e.category());
        }

        let recorded = match decide(&job, result, self.config.max_retries) {
            Outcome::Done => {
                self.metrics.job_processed(started.elapsed());
                Ok(())
            }
            Outcome::Retry(next) => self.producer.send(&next).await.map(|_| {
                self.metrics.job_retried();
            }),
            Outcome::DeadLetter(reason) => self
                .dlq
                .move_to_dlq(&job, &reason, &message.id)
                .await
                .map(|_| self.metrics.job_moved_to_dlq()),
        };

        match recorded {
            Ok(()) => self.ack(&message).await,
            // Left pending; recovered on the next start of this consumer.
            Err(e) => error!(message_id = %message.id, error = %e, "Failed to record job outcome"),
        }
    }

    fn parse(&self, message: &StreamMessage) -> Option<J> {
        let Some(payload) = message.payload.as_deref() else {
            warn!(message_id = %message.id, "Missing 'job' field in message, dropping");
            return None;
        };

        match serde_json::from_str(payload) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!(message_id = %message.id, error = %e, "Failed to parse job, dropping");
                None
            }
        }
    }

    async fn ack(&self, message: &StreamMessage) {
        if let Err(e) = self.consumer.ack(message).await {
            error!(stream = %message.stream, message_id = %message.id, error = %e, "Failed to acknowledge message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestJob {
        id: String,
        retry_count: u32,
    }

    impl StreamJob for TestJob {
        fn job_id(&self) -> String {
            self.id.clone()
        }
        fn retry_count(&self) -> u32 {
            self.retry_count
        }
        fn with_retry(&self) -> Self {
            Self {
                retry_count: self.retry_count + 1,
                ..self.clone()
            }
        }
    }

    fn job(retry_count: u32) -> TestJob {
        TestJob {
            id: "job-1".into(),
            retry_count,
        }
    }

    #[test]
    fn test_success_is_done() {
        assert_eq!(decide(&job(0), Ok(()), 3), Outcome::Done);
        assert_eq!(decide(&job(2), Ok(()), 3), Outcome::Done);
    }

    #[test]
    fn test_first_failures_are_retried_with_bumped_count() {
        let failure = || Err(StreamError::processing("boom"));
        assert_eq!(decide(&job(0), failure(), 3), Outcome::Retry(job(1)));
        assert_eq!(decide(&job(1), failure(), 3), Outcome::Retry(job(2)));
    }

    #[test]
    fn test_third_failure_is_dead_lettered() {
        let outcome = decide(&job(2), Err(StreamError::processing("boom")), 3);
        assert_eq!(
            outcome,
            Outcome::DeadLetter("Processing error: boom".to_string())
        );
    }
}
