//! In-process topic publish/subscribe
//!
//! Producers publish messages under a topic key; consumers register sinks on
//! the topics they care about and receive a copy of every message published
//! there while they are subscribed. Nothing is persisted and nothing crosses
//! the process boundary.
//!
//! # Example
//!
//! ```no_run
//! use topic_pubsub::Registry;
//!
//! # async fn example() {
//! let registry = Registry::<&str, String>::new();
//!
//! let (sink, mut inbox) = registry.channel();
//! registry.subscribe("news", sink.clone()).await;
//!
//! registry.publish(&"news", "hello".to_string()).await;
//! assert_eq!(inbox.recv().await.as_deref(), Some("hello"));
//!
//! registry.unsubscribe(&"news", &sink).await;
//! registry.close().await;
//! # }
//! ```
//!
//! # Guarantees
//!
//! - Each subscription receives every message published to its topic while
//!   it is registered.
//! - Publishing never waits for consumers.
//! - No ordering between deliveries, even to the same subscriber.

pub mod error;
pub mod registry;
pub mod sink;
pub mod stats;

pub use error::{Error, Result};
pub use registry::{Registry, RegistryConfig};
pub use sink::{channel, Inbox, SendError, Sink, SinkPermit, TryRecvError};
pub use stats::RegistryStats;
