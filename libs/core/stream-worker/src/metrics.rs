//! Prometheus metrics for stream workers

use crate::error::StreamError;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::info;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, StreamError> {
    PROMETHEUS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| StreamError::Metrics(e.to_string()))?;
        info!("Prometheus metrics initialized");
        Ok(handle)
    })
}

/// Render metrics in the Prometheus text format; empty before [`init_metrics`].
pub fn render_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_default()
}

/// Counters labelled with the stream and processor.
#[derive(Clone)]
pub struct StreamMetrics {
    stream_name: String,
    processor_name: String,
}

impl StreamMetrics {
    pub fn new(stream_name: impl Into<String>, processor_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            processor_name: processor_name.into(),
        }
    }

    pub fn job_received(&self) {
        counter!(
            "stream_worker_jobs_received_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);
    }

    pub fn job_processed(&self, duration: Duration) {
        counter!(
            "stream_worker_jobs_processed_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);

        histogram!(
            "stream_worker_job_duration_seconds",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .record(duration.as_secs_f64());
    }

    pub fn job_failed(&self, category: &'static str) {
        counter!(
            "stream_worker_job_errors_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "category" => category
        )
        .increment(1);
    }

    pub fn job_retried(&self) {
        counter!(
            "stream_worker_jobs_retried_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);
    }

    pub fn job_moved_to_dlq(&self) {
        counter!(
            "stream_worker_jobs_dlq_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = StreamMetrics::new("test:stream", "test_processor");
        assert_eq!(metrics.stream_name, "test:stream");
        assert_eq!(metrics.processor_name, "test_processor");
        // No recorder installed: recording is a no-op.
        metrics.job_received();
    }

    #[test]
    fn test_init_metrics_is_idempotent() {
        let first = init_metrics().unwrap() as *const PrometheusHandle;
        let second = init_metrics().unwrap() as *const PrometheusHandle;
        assert_eq!(first, second);
    }
}
