//! Publishing integration events.

use crate::events::{BistroEvent, BistroEvents, IntegrationEvent};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use stream_worker::{StreamError, StreamProducer};
use tokio::sync::RwLock;
use tracing::{debug, error};

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: BistroEvent) -> Result<(), StreamError>;
}

/// Appends events to `bistro:events`.
#[derive(Clone)]
pub struct RedisEventPublisher {
    producer: StreamProducer,
}

impl RedisEventPublisher {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            producer: StreamProducer::from_stream_def::<BistroEvents>(redis),
        }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: BistroEvent) -> Result<(), StreamError> {
        let envelope = IntegrationEvent::new(event);
        match self.producer.send(&envelope).await {
            Ok(stream_id) => {
                debug!(
                    event_id = %envelope.event_id,
                    event_type = envelope.event_type(),
                    stream_id = %stream_id,
                    "Published event"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    event_id = %envelope.event_id,
                    event_type = envelope.event_type(),
                    error = %e,
                    "Failed to publish event"
                );
                Err(e)
            }
        }
    }
}

/// Records published events; used by tests and local runs without Redis.
#[derive(Clone, Default)]
pub struct InMemoryEventPublisher {
    events: Arc<RwLock<Vec<IntegrationEvent>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every `publish` fails.
    pub fn failing() -> Self {
        let publisher = Self::default();
        publisher.set_failing(true);
        publisher
    }

    /// Toggle failures on every clone sharing this publisher.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn published(&self) -> Vec<BistroEvent> {
        self.events
            .read()
            .await
            .iter()
            .map(|e| e.event.clone())
            .collect()
    }

    pub async fn event_types(&self) -> Vec<&'static str> {
        self.events
            .read()
            .await
            .iter()
            .map(IntegrationEvent::event_type)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: BistroEvent) -> Result<(), StreamError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StreamError::processing("event bus unavailable"));
        }
        self.events.write().await.push(IntegrationEvent::new(event));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::OrderDeleted;
    use chrono::Utc;
    use uuid::Uuid;

    fn event() -> BistroEvent {
        BistroEvent::OrderDeleted(OrderDeleted {
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            deleted_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_in_memory_publisher_records_events() {
        let publisher = InMemoryEventPublisher::new();
        publisher.publish(event()).await.unwrap();

        assert_eq!(publisher.event_types().await, vec!["OrderDeleted"]);
        assert_eq!(publisher.published().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_publisher() {
        let publisher = InMemoryEventPublisher::failing();
        assert!(publisher.publish(event()).await.is_err());
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_publisher_recovers_after_outage() {
        let publisher = InMemoryEventPublisher::failing();
        let shared = publisher.clone();
        assert!(shared.publish(event()).await.is_err());

        publisher.set_failing(false);
        shared.publish(event()).await.unwrap();
        assert_eq!(publisher.event_types().await, vec!["OrderDeleted"]);
    }
}
