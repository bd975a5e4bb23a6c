//! Consumer-group reads and acknowledgements.

use crate::config::WorkerConfig;
use crate::error::StreamError;
use redis::RedisResult;
use redis::aio::ConnectionManager;
use tracing::{debug, info};

type StreamEntries = Vec<(String, Vec<(String, String)>)>;
type StreamReply = Vec<(String, StreamEntries)>;

/// A raw stream entry; `payload` is the `job` field when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMessage {
    /// Stream the entry was read from
    pub stream: String,
    pub id: String,
    pub payload: Option<String>,
}

pub struct StreamConsumer {
    redis: ConnectionManager,
    config: WorkerConfig,
}

impl StreamConsumer {
    pub fn new(redis: ConnectionManager, config: WorkerConfig) -> Self {
        Self { redis, config }
    }

    /// Create the consumer group on the shared and retry streams unless it exists.
    pub async fn init_consumer_group(&self) -> Result<(), StreamError> {
        for stream in self.config.streams() {
            self.create_group(stream).await?;
        }
        Ok(())
    }

    async fn create_group(&self, stream: &str) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(stream)
            .arg(&self.config.consumer_group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                info!(
                    stream = %stream,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(stream = %stream, group = %self.config.consumer_group, "Consumer group already exists");
                Ok(())
            }
            Err(e) => Err(StreamError::Redis(e)),
        }
    }

    /// Entries delivered to this consumer earlier but never acknowledged.
    pub async fn read_pending(&self) -> Result<Vec<StreamMessage>, StreamError> {
        let mut conn = self.redis.clone();

        let reply: Option<StreamReply> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("COUNT")
            .arg(self.config.batch_size)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(&self.config.retry_stream)
            .arg("0")
            .arg("0")
            .query_async(&mut conn)
            .await?;

        Ok(flatten(reply))
    }

    /// New entries, blocking up to `block_timeout_ms`.
    pub async fn read_new(&self) -> Result<Vec<StreamMessage>, StreamError> {
        let mut conn = self.redis.clone();

        let reply: Option<StreamReply> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("COUNT")
            .arg(self.config.batch_size)
            .arg("BLOCK")
            .arg(self.config.block_timeout_ms)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(&self.config.retry_stream)
            .arg(">")
            .arg(">")
            .query_async(&mut conn)
            .await?;

        Ok(flatten(reply))
    }

    pub async fn ack(&self, message: &StreamMessage) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let _: i64 = redis::cmd("XACK")
            .arg(&message.stream)
            .arg(&self.config.consumer_group)
            .arg(&message.id)
            .query_async(&mut conn)
            .await?;

        debug!(stream = %message.stream, stream_id = %message.id, "Acknowledged message");
        Ok(())
    }
}

fn flatten(reply: Option<StreamReply>) -> Vec<StreamMessage> {
    reply
        .unwrap_or_default()
        .into_iter()
        .flat_map(|(stream, entries)| {
            entries.into_iter().map(move |(id, fields)| StreamMessage {
                stream: stream.clone(),
                payload: fields.into_iter().find(|(k, _)| k == "job").map(|(_, v)| v),
                id,
            })
        })
        .collect()
}
