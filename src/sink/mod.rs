//! Consumer-side delivery handles
//!
//! A [`Sink`] is the send-only end a consumer hands to the registry; the
//! matching [`Inbox`] is the end the consumer drains. Sinks are cheap to
//! clone and every clone refers to the same channel, so a sink can be passed
//! to `subscribe` and later to `unsubscribe` and still be recognised.
//!
//! ```text
//!   Registry::publish()
//!         │  tokio::spawn per subscriber
//!         ▼
//!   Sink::send() ──► mpsc (bounded) ──► Inbox::recv()
//!         ▲                                  ▲
//!         └──── watch<bool> close signal ────┘
//! ```
//!
//! Sends wait for free capacity, so a consumer that stops draining holds up
//! only the deliveries aimed at it. Closing a sink is explicit and shared by
//! all clones; the inbox yields what was already buffered and then `None`.

pub mod channel;
pub mod error;

pub use channel::{channel, Inbox, Sink, SinkPermit};
pub use error::{SendError, TryRecvError};
