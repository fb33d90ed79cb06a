//! Bounded sink channel with explicit close

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::error::TryRecvError as MpscTryRecvError;
use tokio::sync::{mpsc, watch};

use super::error::{SendError, TryRecvError};

/// Create a sink and the inbox that drains it
///
/// `capacity` is the number of messages that can be buffered before
/// [`Sink::send`] starts waiting. It is clamped to at least 1.
pub fn channel<M>(capacity: usize) -> (Sink<M>, Inbox<M>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (closed_tx, closed_rx) = watch::channel(false);

    let sink = Sink {
        tx,
        closed: Arc::new(closed_tx),
    };
    let inbox = Inbox {
        rx,
        closed: closed_rx,
        terminated: false,
    };

    (sink, inbox)
}

/// Send-only handle to a consumer's inbox
///
/// Clones share the channel and the close signal; [`Sink::same_sink`] is the
/// identity used by the registry to match registrations.
pub struct Sink<M> {
    tx: mpsc::Sender<M>,
    closed: Arc<watch::Sender<bool>>,
}

impl<M> Sink<M> {
    /// Deliver a message, waiting for capacity if the inbox is full
    ///
    /// Fails with [`SendError::Closed`] if the sink is closed before a slot
    /// frees up, and with [`SendError::Disconnected`] if the inbox is gone.
    pub async fn send(&self, msg: M) -> Result<(), SendError<M>> {
        match self.reserve().await {
            Ok(slot) => {
                slot.send(msg);
                Ok(())
            }
            Err(SendError::Closed(())) => Err(SendError::Closed(msg)),
            Err(SendError::Disconnected(())) => Err(SendError::Disconnected(msg)),
        }
    }

    /// Wait for a free slot in the inbox without committing a message
    ///
    /// The slot is held until the returned permit is used or dropped. Fails
    /// the same way as [`send`](Self::send).
    pub async fn reserve(&self) -> Result<SinkPermit<'_, M>, SendError<()>> {
        let mut closed = self.closed.subscribe();

        tokio::select! {
            biased;
            _ = closed.wait_for(|closed| *closed) => Err(SendError::Closed(())),
            permit = self.tx.reserve() => match permit {
                Ok(permit) => Ok(SinkPermit { permit }),
                Err(_) => Err(SendError::Disconnected(())),
            },
        }
    }

    /// Signal end-of-stream to the inbox
    ///
    /// Returns `true` if this call closed the sink, `false` if it was
    /// already closed.
    pub fn close(&self) -> bool {
        !self.closed.send_replace(true)
    }

    /// Whether the sink has been closed
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Whether both handles refer to the same channel
    pub fn same_sink(&self, other: &Sink<M>) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// Buffer size of the underlying channel
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

impl<M> Clone for Sink<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<M> fmt::Debug for Sink<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A reserved slot in a sink's inbox
pub struct SinkPermit<'a, M> {
    permit: mpsc::Permit<'a, M>,
}

impl<M> SinkPermit<'_, M> {
    /// Hand the message over; never waits
    pub fn send(self, msg: M) {
        self.permit.send(msg);
    }
}

impl<M> fmt::Debug for SinkPermit<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkPermit").finish_non_exhaustive()
    }
}

/// Receiving end of a sink, owned by the consumer
pub struct Inbox<M> {
    rx: mpsc::Receiver<M>,
    closed: watch::Receiver<bool>,
    /// Set once the close signal has been observed and the channel sealed
    terminated: bool,
}

impl<M> Inbox<M> {
    /// Receive the next message
    ///
    /// Returns `None` once the sink is closed and the buffer is drained, or
    /// when every sink handle has been dropped.
    pub async fn recv(&mut self) -> Option<M> {
        if !self.terminated {
            let closed = tokio::select! {
                biased;
                msg = self.rx.recv() => return msg,
                _ = self.closed.wait_for(|closed| *closed) => true,
            };

            if closed {
                self.terminate();
            }
        }

        self.rx.recv().await
    }

    /// Receive a message without waiting
    pub fn try_recv(&mut self) -> Result<M, TryRecvError> {
        if !self.terminated && *self.closed.borrow() {
            self.terminate();
        }

        self.rx.try_recv().map_err(|e| match e {
            MpscTryRecvError::Empty if self.terminated => TryRecvError::Closed,
            MpscTryRecvError::Empty => TryRecvError::Empty,
            MpscTryRecvError::Disconnected => TryRecvError::Closed,
        })
    }

    /// Whether the sink feeding this inbox has been closed
    pub fn is_closed(&self) -> bool {
        self.terminated || *self.closed.borrow()
    }

    /// Seal the channel so late sends are rejected, keeping buffered messages
    fn terminate(&mut self) {
        self.rx.close();
        self.terminated = true;
    }
}

impl<M> fmt::Debug for Inbox<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inbox")
            .field("buffered", &self.rx.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;

    #[tokio::test]
    async fn test_send_recv() {
        let (sink, mut inbox) = channel(4);

        sink.send(1).await.unwrap();
        sink.send(2).await.unwrap();

        assert_eq!(inbox.recv().await, Some(1));
        assert_eq!(inbox.recv().await, Some(2));
        assert_eq!(inbox.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_capacity_clamped() {
        let (sink, _inbox) = channel::<u8>(0);
        assert_eq!(sink.capacity(), 1);

        let (sink, _inbox) = channel::<u8>(32);
        assert_eq!(sink.capacity(), 32);
    }

    #[test]
    fn test_same_sink() {
        let (a, _ia) = channel::<u8>(1);
        let (b, _ib) = channel::<u8>(1);

        assert!(a.same_sink(&a.clone()));
        assert!(!a.same_sink(&b));
    }

    #[test]
    fn test_close_once() {
        let (sink, inbox) = channel::<u8>(1);
        let other = sink.clone();

        assert!(!inbox.is_closed());
        assert!(sink.close());
        assert!(!other.close());
        assert!(other.is_closed());
        assert!(inbox.is_closed());
    }

    #[tokio::test]
    async fn test_close_drains_buffer_then_ends() {
        let (sink, mut inbox) = channel(4);

        sink.send("a").await.unwrap();
        sink.send("b").await.unwrap();
        sink.close();

        assert_eq!(inbox.recv().await, Some("a"));
        assert_eq!(inbox.recv().await, Some("b"));
        assert_eq!(inbox.recv().await, None);
        // End of stream is sticky
        assert_eq!(inbox.recv().await, None);
        assert_eq!(inbox.try_recv(), Err(TryRecvError::Closed));
    }

    #[tokio::test]
    async fn test_send_after_close() {
        let (sink, _inbox) = channel(4);
        sink.close();

        let err = sink.send(42).await.unwrap_err();
        assert!(err.is_closed());
        assert_eq!(err.into_inner(), 42);
    }

    #[tokio::test]
    async fn test_reserve_holds_slot() {
        let (sink, mut inbox) = channel(1);

        let slot = sink.reserve().await.unwrap();

        // The only slot is taken, so a second reservation waits
        let mut second = task::spawn(sink.reserve());
        assert_pending!(second.poll());

        slot.send(5);
        assert_eq!(inbox.recv().await, Some(5));
        assert!(second.is_woken());
        assert!(assert_ready!(second.poll()).is_ok());
    }

    #[tokio::test]
    async fn test_reserve_after_close() {
        let (sink, _inbox) = channel::<u8>(1);
        sink.close();

        assert!(sink.reserve().await.unwrap_err().is_closed());
    }

    #[tokio::test]
    async fn test_send_after_inbox_dropped() {
        let (sink, inbox) = channel(4);
        drop(inbox);

        let err = sink.send(42).await.unwrap_err();
        assert!(matches!(err, SendError::Disconnected(42)));
    }

    #[test]
    fn test_close_releases_blocked_send() {
        let (sink, mut inbox) = channel(1);

        // Fill the only slot
        let mut first = task::spawn(sink.send(1));
        assert_ready!(first.poll()).unwrap();
        drop(first);

        let mut blocked = task::spawn(sink.send(2));
        assert_pending!(blocked.poll());

        sink.close();
        assert!(blocked.is_woken());
        let err = assert_ready!(blocked.poll()).unwrap_err();
        assert_eq!(err.into_inner(), 2);

        assert_eq!(inbox.try_recv(), Ok(1));
        assert_eq!(inbox.try_recv(), Err(TryRecvError::Closed));
    }

    #[test]
    fn test_recv_pending_until_close() {
        let (sink, mut inbox) = channel::<u8>(1);

        let mut recv = task::spawn(inbox.recv());
        assert_pending!(recv.poll());

        sink.close();
        assert!(recv.is_woken());
        assert_eq!(assert_ready!(recv.poll()), None);
    }

    #[tokio::test]
    async fn test_recv_ends_when_all_sinks_dropped() {
        let (sink, mut inbox) = channel::<u8>(1);
        drop(sink);

        let result = timeout(Duration::from_secs(1), inbox.recv()).await;
        assert_eq!(result.unwrap(), None);
    }
}
