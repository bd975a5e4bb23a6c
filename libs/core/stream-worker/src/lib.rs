//! Stream Worker
//!
//! Redis Streams plumbing shared by every service that publishes or consumes
//! integration events.
//!
//! - `StreamProducer` appends JSON jobs with `XADD MAXLEN ~`
//! - `StreamWorker<J, P>` reads a consumer group and hands each job to a `StreamProcessor`
//! - Failed jobs are re-enqueued with an incremented retry count, then dead-lettered
//! - Prometheus counters for received, processed, failed, retried and dead-lettered jobs
//!
//! ```ignore
//! use stream_worker::{StreamDef, StreamWorker, WorkerConfig};
//!
//! struct Events;
//! impl StreamDef for Events {
//!     const STREAM_NAME: &'static str = "app:events";
//!     const DLQ_STREAM: &'static str = "app:events:dlq";
//! }
//!
//! let config = WorkerConfig::from_stream_def::<Events>("mailer");
//! let worker = StreamWorker::new(redis, Arc::new(processor), config);
//! worker.run(shutdown_rx).await?;
//! ```

mod config;
mod consumer;
mod dlq;
mod error;
pub mod metrics;
mod producer;
mod registry;
mod worker;

pub use config::WorkerConfig;
pub use consumer::{StreamConsumer, StreamMessage};
pub use dlq::{DlqEntry, DlqManager};
pub use error::StreamError;
pub use metrics::{StreamMetrics, init_metrics, render_metrics};
pub use producer::StreamProducer;
pub use registry::{StreamDef, StreamJob, StreamProcessor};
pub use worker::{Outcome, StreamWorker, decide};
