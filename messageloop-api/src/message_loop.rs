use crate::state::LoopState;
use crate::types::{BoxedPayload, LoopResult};

/// A self-contained event loop that waits for messages on one worker and
/// dispatches each of them to its [`Handler`].
///
/// All methods are thread-safe. The boolean methods are the plain contract;
/// the `try_*` methods carry the reason a call was refused.
///
/// # Lifecycle
///
/// `start` succeeds once, `shutdown` succeeds once and only after `start`.
/// Messages accepted before shutdown are still delivered; nothing is accepted
/// after it.
pub trait MessageLoop<P = BoxedPayload>: Send + Sync
where
    P: Send + 'static,
{
    /// Starts the loop. Messages posted from this point reach the handler.
    fn try_start(&self) -> LoopResult<()>;

    /// Queues a message for the handler.
    ///
    /// # Parameters
    /// * `msg_type` - Implementation specific message type
    /// * `payload` - Optional value that complements the type
    fn try_post(&self, msg_type: i32, payload: Option<P>) -> LoopResult<()>;

    /// Stops accepting messages and lets the worker finish what is queued.
    fn try_shutdown(&self) -> LoopResult<()>;

    /// Whether the calling context is the loop's worker.
    fn is_on_loop(&self) -> bool;

    /// Snapshot of the lifecycle state.
    fn state(&self) -> LoopState;

    /// Returns whether the start was successful.
    fn start(&self) -> bool {
        self.try_start().is_ok()
    }

    /// Returns whether the message was queued.
    fn post(&self, msg_type: i32, payload: Option<P>) -> bool {
        self.try_post(msg_type, payload).is_ok()
    }

    /// Returns whether the shutdown was successful.
    fn shutdown(&self) -> bool {
        self.try_shutdown().is_ok()
    }
}

/// Receives messages dispatched by a [`MessageLoop`].
///
/// Only ever called on the loop's worker, one message at a time, so an
/// implementation needs no synchronization against itself.
pub trait Handler<P = BoxedPayload>: Send {
    /// Handles one message.
    fn handle(&mut self, msg_type: i32, payload: Option<P>);
}

impl<P, F> Handler<P> for F
where
    F: FnMut(i32, Option<P>) + Send,
{
    fn handle(&mut self, msg_type: i32, payload: Option<P>) {
        self(msg_type, payload)
    }
}
