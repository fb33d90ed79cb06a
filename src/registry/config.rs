//! Registry configuration

/// Default buffer size for sinks created through [`Registry::channel`](super::Registry::channel)
pub const DEFAULT_SINK_CAPACITY: usize = 16;

/// Registry configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Buffer size of sinks created by the registry (minimum 1)
    pub sink_capacity: usize,

    /// Maximum deliveries sending at the same time (0 = unlimited)
    ///
    /// Every publish still spawns one task per subscriber. Each task first
    /// waits for room in its own sink, then queues for a permit to hand the
    /// message over. A consumer that never drains holds no permits, so it
    /// cannot hold up deliveries to anyone else. The publisher never waits.
    pub max_concurrent_deliveries: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sink_capacity: DEFAULT_SINK_CAPACITY,
            max_concurrent_deliveries: 0, // Unlimited
        }
    }
}

impl RegistryConfig {
    /// Set the buffer size of registry-created sinks
    pub fn sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity.max(1);
        self
    }

    /// Limit concurrent deliveries (0 = unlimited)
    pub fn max_concurrent_deliveries(mut self, max: usize) -> Self {
        self.max_concurrent_deliveries = max;
        self
    }
}
