use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use flume::{Receiver, Sender, TryRecvError, TrySendError};

use super::error::{QueueError, Rejected};

/// Multi-producer, single-consumer queue the loop engine dispatches from.
///
/// Implementors must be FIFO and internally synchronized: producers call
/// `offer` concurrently while the single worker calls `take` or `poll`.
pub trait BlockingQueue<T>: Send + Sync {
    /// Enqueues without blocking. A refused item is handed back.
    fn offer(&self, item: T) -> Result<(), Rejected<T>>;

    /// Dequeues, blocking while the queue is empty.
    ///
    /// Returns `None` only once the queue has been interrupted and holds
    /// nothing; items queued before the interrupt are still returned.
    fn take(&self) -> Option<T>;

    /// Dequeues without blocking.
    fn poll(&self) -> Option<T>;

    /// Wakes a pending `take` and makes every later `take` return `None` as
    /// soon as the queue is empty. Sticky.
    fn interrupt(&self);

    /// Number of queued items (snapshot in time).
    fn len(&self) -> usize;

    /// Checks if the queue is currently empty (snapshot in time).
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured bound, `None` when unbounded.
    fn capacity(&self) -> Option<usize>;
}

enum Wakeup<T> {
    Item(T),
    Interrupted,
    Disconnected,
}

/// [`BlockingQueue`] over a flume channel.
///
/// A second, single-slot channel carries the interrupt so that a blocked
/// `take` can be woken with a select instead of a thread interrupt.
pub struct FlumeQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    interrupted: AtomicBool,
}

impl<T> FlumeQueue<T> {
    pub fn unbounded() -> Self {
        Self::from_channel(flume::unbounded())
    }

    /// Creates a queue refusing offers once `capacity` items are waiting.
    pub fn bounded(capacity: usize) -> Self {
        Self::from_channel(flume::bounded(capacity))
    }

    /// Bounded when `capacity` is set, unbounded otherwise.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    fn from_channel((sender, receiver): (Sender<T>, Receiver<T>)) -> Self {
        let (wake_tx, wake_rx) = flume::bounded(1);
        Self {
            sender,
            receiver,
            wake_tx,
            wake_rx,
            interrupted: AtomicBool::new(false),
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }
}

impl<T: Send> BlockingQueue<T> for FlumeQueue<T> {
    fn offer(&self, item: T) -> Result<(), Rejected<T>> {
        match self.sender.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(item)) => Err(Rejected::new(
                item,
                QueueError::Full {
                    capacity: self.sender.capacity().unwrap_or(0),
                },
            )),
            Err(TrySendError::Disconnected(item)) => Err(Rejected::new(item, QueueError::Closed)),
        }
    }

    fn take(&self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(item) => return Some(item),
                Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) => {}
            }
            if self.is_interrupted() {
                return None;
            }

            let wakeup = flume::Selector::new()
                .recv(&self.receiver, |res| match res {
                    Ok(item) => Wakeup::Item(item),
                    Err(_) => Wakeup::Disconnected,
                })
                .recv(&self.wake_rx, |_| Wakeup::Interrupted)
                .wait();

            match wakeup {
                Wakeup::Item(item) => return Some(item),
                Wakeup::Disconnected => return None,
                // Re-check the channel before honouring the interrupt.
                Wakeup::Interrupted => continue,
            }
        }
    }

    fn poll(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
        let _ = self.wake_tx.try_send(());
    }

    fn len(&self) -> usize {
        self.receiver.len()
    }

    fn capacity(&self) -> Option<usize> {
        self.sender.capacity()
    }
}

impl<T> fmt::Debug for FlumeQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlumeQueue")
            .field("len", &self.receiver.len())
            .field("capacity", &self.sender.capacity())
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}
