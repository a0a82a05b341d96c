//! # Message Loop Error Types
//!
//! Every operation of a message loop that can be refused because of the
//! lifecycle reports the refusal as a [`LoopError`]. None of these are faults:
//! they are idempotency checks surfaced to the caller, and the boolean forms of
//! the operations collapse them to `false`.
//!
//! ## Usage Example
//!
//! ```rust
//! use messageloop_api::errors::LoopError;
//!
//! fn describe(error: LoopError) -> &'static str {
//!     match error {
//!         LoopError::NotStarted => "post before start",
//!         LoopError::Stopped => "loop already shut down",
//!         LoopError::QueueFull { .. } => "back off and retry",
//!         _ => "rejected",
//!     }
//! }
//! ```

use thiserror::Error;

/// Reason a message loop operation was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoopError {
    /// The loop has not been started yet.
    #[error("Message loop has not been started")]
    NotStarted,

    /// `start` was called on a loop that already left the initial state.
    #[error("Message loop has already been started")]
    AlreadyStarted,

    /// The loop has been shut down and accepts nothing further.
    #[error("Message loop is stopped")]
    Stopped,

    /// A bounded queue refused the message.
    ///
    /// # Parameters
    /// * `capacity` - The bound of the queue that refused it
    #[error("Message queue is full (capacity: {capacity})")]
    QueueFull { capacity: usize },

    /// The queue no longer accepts messages.
    #[error("Message queue is closed")]
    QueueClosed,

    /// The worker could not be created.
    #[error("Failed to spawn loop worker: {0}")]
    SpawnFailed(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Waiting for the worker requires a prior shutdown.
    #[error("Message loop has not been shut down")]
    NotStopped,

    /// The worker tried to wait for its own termination.
    #[error("Cannot join the message loop from its own worker")]
    JoinFromLoop,

    /// The handler panicked and took the worker down.
    #[error("Loop worker panicked: {0}")]
    WorkerPanicked(String),
}

impl LoopError {
    /// Whether the error is a lifecycle rejection rather than a resource problem.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            LoopError::NotStarted | LoopError::AlreadyStarted | LoopError::Stopped | LoopError::NotStopped
        )
    }
}
