//! Registry statistics

pub mod metrics;

pub use metrics::RegistryStats;
pub(crate) use metrics::DeliveryCounters;
