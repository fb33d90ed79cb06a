//! Statistics and counters for the registry

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Topics with at least one subscriber
    pub topics: usize,
    /// Registrations across all topics (duplicates counted separately)
    pub subscriptions: usize,
    /// Publish calls, including those to topics without subscribers
    pub messages_published: u64,
    /// Delivery units spawned
    pub deliveries_scheduled: u64,
    /// Deliveries accepted by their sink
    pub deliveries_completed: u64,
    /// Deliveries dropped because the sink was closed or its inbox dropped
    pub deliveries_failed: u64,
}

impl RegistryStats {
    /// Deliveries spawned but not yet finished
    ///
    /// Includes units waiting on a full sink.
    pub fn deliveries_in_flight(&self) -> u64 {
        self.deliveries_scheduled
            .saturating_sub(self.deliveries_completed)
            .saturating_sub(self.deliveries_failed)
    }
}

/// Counters shared between the registry and its delivery units
#[derive(Debug, Default)]
pub(crate) struct DeliveryCounters {
    published: AtomicU64,
    scheduled: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl DeliveryCounters {
    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scheduled(&self, count: usize) {
        self.scheduled.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Fill the counter fields of a stats snapshot
    pub(crate) fn snapshot(&self, topics: usize, subscriptions: usize) -> RegistryStats {
        RegistryStats {
            topics,
            subscriptions,
            messages_published: self.published.load(Ordering::Relaxed),
            deliveries_scheduled: self.scheduled.load(Ordering::Relaxed),
            deliveries_completed: self.completed.load(Ordering::Relaxed),
            deliveries_failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
