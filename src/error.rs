//! Error types

use crate::sink::SendError;

/// Crate-level error
///
/// The registry itself never fails; these errors come from sending into a
/// sink directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The sink was closed
    #[error("sink closed")]
    SinkClosed,
    /// The sink's inbox was dropped
    #[error("sink disconnected: inbox dropped")]
    SinkDisconnected,
}

/// Result alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

impl<M> From<SendError<M>> for Error {
    fn from(err: SendError<M>) -> Self {
        match err {
            SendError::Closed(_) => Error::SinkClosed,
            SendError::Disconnected(_) => Error::SinkDisconnected,
        }
    }
}
