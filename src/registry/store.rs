//! Topic registry implementation
//!
//! The central registry that maps topics to subscribed sinks and fans
//! published messages out to them.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{RwLock, Semaphore};

use super::config::RegistryConfig;
use super::entry::TopicEntry;
use crate::sink::{self, Inbox, Sink};
use crate::stats::{DeliveryCounters, RegistryStats};

/// Central registry for all topic subscriptions
///
/// Thread-safe via `RwLock`. Publishing only takes the read lock, and only
/// long enough to copy the subscriber list; sends happen afterwards in
/// spawned tasks, so a stalled consumer never holds the lock.
pub struct Registry<T, M> {
    /// Map of topic to subscription list
    topics: RwLock<HashMap<T, TopicEntry<M>>>,

    /// Set once by `close`
    closed: AtomicBool,

    /// Configuration
    config: RegistryConfig,

    /// Counters shared with delivery tasks
    counters: Arc<DeliveryCounters>,

    /// Delivery permits when `max_concurrent_deliveries` is set
    delivery_permits: Option<Arc<Semaphore>>,
}

impl<T, M> Registry<T, M>
where
    T: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    M: Clone + Send + 'static,
{
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        let delivery_permits = if config.max_concurrent_deliveries > 0 {
            Some(Arc::new(Semaphore::new(config.max_concurrent_deliveries)))
        } else {
            None
        };

        Self {
            topics: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
            config,
            counters: Arc::new(DeliveryCounters::default()),
            delivery_permits,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a sink/inbox pair sized by `config.sink_capacity`
    ///
    /// The registry does not keep the sink; pass it to [`subscribe`](Self::subscribe).
    pub fn channel(&self) -> (Sink<M>, Inbox<M>) {
        sink::channel(self.config.sink_capacity)
    }

    /// Subscribe a sink to a topic
    ///
    /// The sink is appended to the topic's list, creating the topic if
    /// needed. Registering the same sink again adds an independent
    /// subscription that receives its own copy of every message.
    ///
    /// Calling this after [`close`](Self::close) is a misuse; the sink is
    /// ignored and a warning is logged.
    pub async fn subscribe(&self, topic: T, sink: Sink<M>) {
        let mut topics = self.topics.write().await;

        if self.closed.load(Ordering::Acquire) {
            tracing::warn!(topic = ?topic, "Subscribe on closed registry ignored");
            return;
        }

        let subscribers = {
            let entry = topics.entry(topic.clone()).or_insert_with(TopicEntry::new);
            entry.push(sink);
            entry.len()
        };

        tracing::debug!(
            topic = ?topic,
            subscribers = subscribers,
            "Subscriber added"
        );
    }

    /// Remove one subscription of a sink from a topic
    ///
    /// The first registration of the same sink is removed; the order of the
    /// rest is kept. When the last subscriber leaves, the topic is dropped.
    /// Unknown topics and sinks are ignored. Returns whether a subscription
    /// was removed.
    pub async fn unsubscribe(&self, topic: &T, sink: &Sink<M>) -> bool {
        let mut topics = self.topics.write().await;

        let Some(entry) = topics.get_mut(topic) else {
            return false;
        };

        if !entry.remove(sink) {
            return false;
        }

        let remaining = entry.len();
        if remaining == 0 {
            topics.remove(topic);
        }

        tracing::debug!(
            topic = ?topic,
            subscribers = remaining,
            "Subscriber removed"
        );

        true
    }

    /// Publish a message to every current subscriber of a topic
    ///
    /// Each subscription gets its own delivery task with its own clone of the
    /// message. This returns the number of deliveries scheduled without
    /// waiting for any of them; a slow subscriber only delays its own copy.
    /// There is no ordering between deliveries, whether from the same call
    /// or from different calls.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn publish(&self, topic: &T, message: M) -> usize {
        self.counters.record_published();

        // Copy the list so the lock is released before any send
        let snapshot = {
            let topics = self.topics.read().await;
            match topics.get(topic) {
                Some(entry) => entry.snapshot(),
                None => return 0,
            }
        };

        let count = snapshot.len();
        self.counters.record_scheduled(count);

        for sink in snapshot {
            self.spawn_delivery(sink, message.clone());
        }

        tracing::trace!(topic = ?topic, deliveries = count, "Message published");

        count
    }

    /// Close every subscribed sink and empty the registry
    ///
    /// Each sink observes end-of-stream once. Intended to be called once;
    /// further calls are ignored. Deliveries still in flight to a closed sink
    /// are dropped rather than delivered.
    pub async fn close(&self) {
        let mut topics = self.topics.write().await;

        if self.closed.swap(true, Ordering::AcqRel) {
            tracing::warn!("Registry already closed");
            return;
        }

        let drained = std::mem::take(&mut *topics);
        let topic_count = drained.len();
        let sinks_closed: usize = drained.values().map(TopicEntry::close_all).sum();

        if let Some(permits) = &self.delivery_permits {
            permits.close();
        }

        tracing::info!(
            topics = topic_count,
            sinks = sinks_closed,
            "Registry closed"
        );
    }

    /// Check if the registry has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Get number of topics with at least one subscriber
    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }

    /// Get number of subscriptions on a topic
    pub async fn subscriber_count(&self, topic: &T) -> usize {
        self.topics
            .read()
            .await
            .get(topic)
            .map_or(0, TopicEntry::len)
    }

    /// Check if a topic has any subscriber
    pub async fn has_subscribers(&self, topic: &T) -> bool {
        self.topics.read().await.contains_key(topic)
    }

    /// Get the topics that currently have subscribers
    pub async fn topics(&self) -> Vec<T> {
        self.topics.read().await.keys().cloned().collect()
    }

    /// Get registry statistics
    pub async fn stats(&self) -> RegistryStats {
        let topics = self.topics.read().await;
        let subscriptions = topics.values().map(TopicEntry::len).sum();
        self.counters.snapshot(topics.len(), subscriptions)
    }

    /// Spawn one delivery unit
    ///
    /// The unit first waits for room in its own sink, so a stalled consumer
    /// only ever ties up its own units. A delivery permit, when configured,
    /// is taken after that and only covers the hand-off.
    fn spawn_delivery(&self, sink: Sink<M>, message: M) {
        let counters = Arc::clone(&self.counters);
        let permits = self.delivery_permits.clone();

        tokio::spawn(async move {
            let slot = match sink.reserve().await {
                Ok(slot) => slot,
                Err(e) => {
                    counters.record_failed();
                    tracing::debug!(error = %e, "Delivery dropped");
                    return;
                }
            };

            let _permit = match permits {
                Some(permits) => match permits.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        // Registry closed while queued
                        counters.record_failed();
                        tracing::debug!("Delivery dropped, registry closed");
                        return;
                    }
                },
                None => None,
            };

            // The sink may have been closed while waiting for a permit
            if sink.is_closed() {
                counters.record_failed();
                tracing::debug!("Delivery dropped, sink closed");
                return;
            }

            slot.send(message);
            counters.record_completed();
            tracing::trace!("Message delivered");
        });
    }
}

impl<T, M> Default for Registry<T, M>
where
    T: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    M: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
