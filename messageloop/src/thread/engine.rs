//! # Blocking Queue Message Loop
//!
//! The loop engine: one dedicated worker thread draining a [`BlockingQueue`]
//! into a [`Handler`], fed by any number of producer threads.
//!
//! ## Key Concepts
//! - Lifecycle: `PreStart -> Started -> Stopped`, each transition taken once
//! - One lock: the lifecycle state and the message pool sit behind a single
//!   mutex, held for `post` (check, obtain, offer) and for the worker's release
//!   step, never while waiting on the queue or running the handler
//! - Two-mode drain: the worker blocks on `take` while started and switches to
//!   `poll` once stopped, exiting on the first empty read
//!
//! ## Shutdown
//! `shutdown` flips the state and interrupts the queue. Everything accepted
//! before the flip is still handed to the handler; an in-flight handler call is
//! never cut short.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use messageloop_api::{BoxedPayload, Handler, LoopError, LoopResult, LoopState, MessageLoop};
use tracing::{debug, error, info, trace};
use uuid::Uuid;

use super::config::LoopConfig;
use super::message::Envelope;
use super::pool::MessagePool;
use super::queue::{BlockingQueue, FlumeQueue};

type HandlerSlot<P> = Arc<Mutex<Option<Box<dyn Handler<P>>>>>;

/// State guarded by the engine lock.
struct Inner<P> {
    state: LoopState,
    pool: MessagePool<P>,
}

/// Everything the worker thread shares with producers.
struct Shared<P> {
    id: Uuid,
    inner: Mutex<Inner<P>>,
    queue: Arc<dyn BlockingQueue<Envelope<P>>>,
    worker_id: OnceLock<ThreadId>,
}

impl<P> Shared<P> {
    // The lock never spans user code, so a poisoned guard still holds
    // consistent data.
    fn lock(&self) -> MutexGuard<'_, Inner<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_message(&self) -> Option<Envelope<P>> {
        let stopped = self.lock().state.is_stopped();
        if stopped {
            self.queue.poll()
        } else {
            self.queue.take()
        }
    }
}

/// [`MessageLoop`] running its own worker thread over a [`BlockingQueue`].
pub struct BlockingQueueMessageLoop<P = BoxedPayload>
where
    P: Send + 'static,
{
    shared: Arc<Shared<P>>,
    handler: HandlerSlot<P>,
    worker: Mutex<Option<JoinHandle<LoopResult<()>>>>,
    thread_name: String,
}

impl<P> BlockingQueueMessageLoop<P>
where
    P: Send + 'static,
{
    /// Creates a loop over an unbounded FIFO queue with the default pool bound.
    pub fn create<H>(handler: H) -> Self
    where
        H: Handler<P> + 'static,
    {
        let config = LoopConfig::default();
        let queue = Arc::new(FlumeQueue::<Envelope<P>>::with_capacity(config.queue_capacity));
        Self::build(handler, queue, config)
    }

    /// Creates a loop whose default queue and pool follow `config`.
    pub fn with_config<H>(handler: H, config: LoopConfig) -> LoopResult<Self>
    where
        H: Handler<P> + 'static,
    {
        config.validate()?;
        let queue = Arc::new(FlumeQueue::<Envelope<P>>::with_capacity(config.queue_capacity));
        Ok(Self::build(handler, queue, config))
    }

    /// Creates a loop dispatching from an externally supplied queue.
    /// `config.queue_capacity` is ignored; the rest of `config` is validated.
    pub fn with_queue<H>(
        handler: H,
        queue: Arc<dyn BlockingQueue<Envelope<P>>>,
        config: LoopConfig,
    ) -> LoopResult<Self>
    where
        H: Handler<P> + 'static,
    {
        config.validate()?;
        Ok(Self::build(handler, queue, config))
    }

    fn build<H>(handler: H, queue: Arc<dyn BlockingQueue<Envelope<P>>>, config: LoopConfig) -> Self
    where
        H: Handler<P> + 'static,
    {
        let id = Uuid::new_v4();
        let thread_name = config.thread_name(&id);
        let handler: Box<dyn Handler<P>> = Box::new(handler);
        Self {
            shared: Arc::new(Shared {
                id,
                inner: Mutex::new(Inner {
                    state: LoopState::PreStart,
                    pool: MessagePool::new(config.pool_max_size),
                }),
                queue,
                worker_id: OnceLock::new(),
            }),
            handler: Arc::new(Mutex::new(Some(handler))),
            worker: Mutex::new(None),
            thread_name,
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Number of retired messages waiting for reuse.
    pub fn pooled_messages(&self) -> usize {
        self.shared.lock().pool.len()
    }

    /// Number of messages accepted but not yet dequeued by the worker.
    pub fn queued_messages(&self) -> usize {
        self.shared.queue.len()
    }

    /// Blocks until the worker has drained the queue and exited.
    ///
    /// Returns the worker's panic, if the handler panicked. Joining twice is a
    /// no-op.
    pub fn join(&self) -> LoopResult<()> {
        if self.is_on_loop() {
            return Err(LoopError::JoinFromLoop);
        }
        match self.state() {
            LoopState::PreStart => return Err(LoopError::NotStarted),
            LoopState::Started => return Err(LoopError::NotStopped),
            LoopState::Stopped => {}
        }

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|panic| Err(LoopError::WorkerPanicked(panic_message(&*panic)))),
            None => Ok(()),
        }
    }
}

impl<P> MessageLoop<P> for BlockingQueueMessageLoop<P>
where
    P: Send + 'static,
{
    fn try_start(&self) -> LoopResult<()> {
        let mut inner = self.shared.lock();
        let next = inner.state.start().inspect_err(|err| {
            trace!(loop_id = %self.shared.id, "start rejected: {}", err);
        })?;

        // Spawned under the lock: nobody can observe `Started` without a worker.
        let shared = Arc::clone(&self.shared);
        let handler = Arc::clone(&self.handler);
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || run_worker(shared, handler))
            .map_err(|err| {
                error!(loop_id = %self.shared.id, "failed to spawn loop worker: {}", err);
                LoopError::SpawnFailed(err.to_string())
            })?;

        let _ = self.shared.worker_id.set(handle.thread().id());
        inner.state = next;
        drop(inner);

        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        info!(loop_id = %self.shared.id, thread = %self.thread_name, "message loop started");
        Ok(())
    }

    fn try_post(&self, msg_type: i32, payload: Option<P>) -> LoopResult<()> {
        let mut inner = self.shared.lock();
        if let Err(err) = inner.state.check_post() {
            trace!(loop_id = %self.shared.id, msg_type, "post rejected: {}", err);
            return Err(err);
        }

        let message = inner.pool.obtain(msg_type, payload);
        match self.shared.queue.offer(message) {
            Ok(()) => Ok(()),
            Err(rejected) => {
                let (message, err) = rejected.into_parts();
                inner.pool.release(message);
                debug!(loop_id = %self.shared.id, msg_type, "queue refused message: {}", err);
                Err(err.into())
            }
        }
    }

    fn try_shutdown(&self) -> LoopResult<()> {
        {
            let mut inner = self.shared.lock();
            inner.state = inner.state.shutdown().inspect_err(|err| {
                trace!(loop_id = %self.shared.id, "shutdown rejected: {}", err);
            })?;
        }
        self.shared.queue.interrupt();
        info!(loop_id = %self.shared.id, "message loop shutting down");
        Ok(())
    }

    fn is_on_loop(&self) -> bool {
        self.shared
            .worker_id
            .get()
            .is_some_and(|id| *id == thread::current().id())
    }

    fn state(&self) -> LoopState {
        self.shared.lock().state
    }
}

impl<P> Drop for BlockingQueueMessageLoop<P>
where
    P: Send + 'static,
{
    fn drop(&mut self) {
        if self.try_shutdown().is_ok() {
            debug!(loop_id = %self.shared.id, "message loop dropped while started");
        }
    }
}

impl<P> fmt::Debug for BlockingQueueMessageLoop<P>
where
    P: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("BlockingQueueMessageLoop")
            .field("id", &self.shared.id)
            .field("state", &inner.state)
            .field("pool", &inner.pool)
            .field("queued", &self.shared.queue.len())
            .field("thread_name", &self.thread_name)
            .finish()
    }
}

/// Worker thread body.
fn run_worker<P>(shared: Arc<Shared<P>>, slot: HandlerSlot<P>) -> LoopResult<()>
where
    P: Send + 'static,
{
    let span = crate::loop_span!("blocking_queue", shared.id);
    let _guard = span.enter();

    let Some(mut handler) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() else {
        return Ok(());
    };
    debug!("loop worker running");

    let mut dispatched: u64 = 0;
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        while let Some(mut message) = shared.next_message() {
            let (msg_type, payload) = message.take();
            shared.lock().pool.release(message);
            handler.handle(msg_type, payload);
            dispatched += 1;
        }
    }));

    match result {
        Ok(()) => {
            crate::log_lifecycle!("blocking_queue", shared.id, "drained");
            debug!(dispatched, "loop worker exited");
            Ok(())
        }
        Err(panic) => {
            let reason = panic_message(&*panic);
            error!(dispatched, "handler panicked, loop worker exiting: {}", reason);
            shared.lock().state = LoopState::Stopped;
            shared.queue.interrupt();
            Err(LoopError::WorkerPanicked(reason))
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
