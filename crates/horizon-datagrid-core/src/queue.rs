//! UI-affine delivery queue.
//!
//! Background work never touches presenter state directly. Instead it sends
//! its result through a [`UiSender`] and the owning UI thread drains the
//! matching [`UiQueue`] at a point of its choosing, typically once per frame
//! or after each input event.
//!
//! ```
//! use horizon_datagrid_core::queue::UiQueue;
//!
//! let queue = UiQueue::<u32>::unbounded();
//! let sender = queue.sender();
//!
//! std::thread::spawn(move || {
//!     sender.send(7).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(queue.drain(), vec![7]);
//! ```

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded, unbounded};

use crate::error::QueueError;
use crate::thread_check::ThreadAffinity;

/// Receiving end of a UI delivery queue, bound to the thread that created it.
#[derive(Debug)]
pub struct UiQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    affinity: ThreadAffinity,
}

/// Sending end of a UI delivery queue. Cheap to clone and `Send`.
#[derive(Debug)]
pub struct UiSender<T> {
    sender: Sender<T>,
}

impl<T> Clone for UiSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Send> UiSender<T> {
    /// Deliver `item` to the UI thread.
    pub fn send(&self, item: T) -> Result<(), QueueError> {
        self.sender.try_send(item).map_err(|err| match err {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Disconnected(_) => QueueError::Disconnected,
        })
    }
}

impl<T> UiQueue<T> {
    /// A queue without a capacity limit.
    pub fn unbounded() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            affinity: ThreadAffinity::current(),
        }
    }

    /// A queue that rejects sends beyond `capacity` pending items.
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            affinity: ThreadAffinity::current(),
        }
    }

    /// A new sending handle.
    pub fn sender(&self) -> UiSender<T> {
        UiSender {
            sender: self.sender.clone(),
        }
    }

    /// Number of items waiting.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Take everything currently queued, in send order.
    ///
    /// # Panics
    ///
    /// Panics (in debug builds) when called off the owning thread.
    pub fn drain(&self) -> Vec<T> {
        self.affinity
            .debug_assert_same_thread_with_msg("UiQueue drained off its owning thread");
        let items: Vec<T> = self.receiver.try_iter().collect();
        if !items.is_empty() {
            tracing::trace!(
                target: "horizon_datagrid_core::queue",
                count = items.len(),
                "drained ui queue"
            );
        }
        items
    }

    /// Wait up to `timeout` for at least one item, then drain.
    ///
    /// Returns an empty vector if nothing arrived in time.
    pub fn drain_timeout(&self, timeout: Duration) -> Vec<T> {
        self.affinity
            .debug_assert_same_thread_with_msg("UiQueue drained off its owning thread");
        let deadline = Instant::now() + timeout;
        match self.receiver.recv_deadline(deadline) {
            Ok(first) => {
                let mut items = vec![first];
                items.extend(self.receiver.try_iter());
                items
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Vec::new(),
        }
    }
}
