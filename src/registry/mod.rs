//! Topic registry for pub/sub routing
//!
//! The registry maps topics to the sinks subscribed to them and fans each
//! published message out to every current subscriber.
//!
//! # Architecture
//!
//! ```text
//!                        Registry<T, M>
//!                 ┌──────────────────────────┐
//!                 │ topics: RwLock<HashMap<  │
//!                 │   T, TopicEntry {        │
//!                 │     sinks: Vec<Sink<M>>, │
//!                 │   }                      │
//!                 │ >>                       │
//!                 └────────────┬─────────────┘
//!                              │ read lock: copy sinks, release
//!         ┌────────────────────┼────────────────────┐
//!         ▼                    ▼                    ▼
//!   tokio::spawn         tokio::spawn         tokio::spawn
//!   sink.send(msg)       sink.send(msg)       sink.send(msg)
//!         │                    │                    │
//!         ▼                    ▼                    ▼
//!   inbox.recv()         inbox.recv()         inbox.recv()
//! ```
//!
//! # Delivery
//!
//! Every subscription gets its own task per publish, so a consumer that
//! stops draining only stalls the tasks aimed at it. Tasks are independent:
//! two messages published one after the other may reach a subscriber in
//! either order. Use `bytes::Bytes` or an `Arc` as the message type to keep
//! the per-subscriber clone cheap.
//!
//! # Close
//!
//! `close` closes every subscribed sink and empties the map. A delivery
//! that is still waiting when its sink is closed gives up and drops its
//! message.

pub mod config;
mod entry;
pub mod store;

pub use config::RegistryConfig;
pub use store::Registry;
