//! Topic entry
//!
//! This module defines the per-topic subscription list stored in the registry.

use crate::sink::Sink;

/// Ordered subscription list for a single topic
///
/// Insertion order is preserved and the same sink may appear more than once;
/// each occurrence is an independent subscription.
pub(crate) struct TopicEntry<M> {
    sinks: Vec<Sink<M>>,
}

impl<M> TopicEntry<M> {
    /// Create an empty entry
    pub(super) fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Append a subscription
    pub(super) fn push(&mut self, sink: Sink<M>) {
        self.sinks.push(sink);
    }

    /// Remove the first subscription that is the same sink
    ///
    /// Returns `false` if the sink is not registered here.
    pub(super) fn remove(&mut self, sink: &Sink<M>) -> bool {
        match self.sinks.iter().position(|s| s.same_sink(sink)) {
            Some(index) => {
                self.sinks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Copy of the current list, taken for delivery
    pub(super) fn snapshot(&self) -> Vec<Sink<M>> {
        self.sinks.clone()
    }

    /// Close every sink, returning how many were closed by this call
    ///
    /// A sink registered twice is only closed once.
    pub(super) fn close_all(&self) -> usize {
        self.sinks.iter().filter(|sink| sink.close()).count()
    }

    /// Number of subscriptions
    pub(super) fn len(&self) -> usize {
        self.sinks.len()
    }
}
