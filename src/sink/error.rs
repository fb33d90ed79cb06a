//! Sink error types

use std::fmt;

/// Error returned when a message could not be handed to a sink
///
/// The undelivered message is returned to the caller.
#[derive(thiserror::Error)]
pub enum SendError<M> {
    /// The sink was closed before or while waiting for capacity
    #[error("sink closed")]
    Closed(M),
    /// The consumer dropped its inbox
    #[error("sink disconnected: inbox dropped")]
    Disconnected(M),
}

impl<M> SendError<M> {
    /// Take back the message that was not delivered
    pub fn into_inner(self) -> M {
        match self {
            SendError::Closed(msg) | SendError::Disconnected(msg) => msg,
        }
    }

    /// Whether the send failed because the sink was closed
    pub fn is_closed(&self) -> bool {
        matches!(self, SendError::Closed(_))
    }
}

impl<M> fmt::Debug for SendError<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Closed(_) => f.write_str("Closed(..)"),
            SendError::Disconnected(_) => f.write_str("Disconnected(..)"),
        }
    }
}

/// Error returned by [`Inbox::try_recv`](super::Inbox::try_recv)
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryRecvError {
    /// Nothing buffered right now
    #[error("inbox empty")]
    Empty,
    /// End of stream: the sink was closed and everything buffered was drained
    #[error("inbox closed")]
    Closed,
}
