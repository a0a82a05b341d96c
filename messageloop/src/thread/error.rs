use messageloop_api::LoopError;
use thiserror::Error;

/// Errors related to queue operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue is full (capacity: {capacity})")]
    Full { capacity: usize },
    #[error("Queue is closed")]
    Closed,
}

impl From<QueueError> for LoopError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Full { capacity } => LoopError::QueueFull { capacity },
            QueueError::Closed => LoopError::QueueClosed,
        }
    }
}

/// An item the queue refused, handed back to the caller with the reason.
#[derive(Debug)]
pub struct Rejected<T> {
    pub item: T,
    pub error: QueueError,
}

impl<T> Rejected<T> {
    pub fn new(item: T, error: QueueError) -> Self {
        Self { item, error }
    }

    pub fn into_parts(self) -> (T, QueueError) {
        (self.item, self.error)
    }
}
