//! # Runtime Message Loop
//!
//! A [`MessageLoop`] that hands its messages to a tokio runtime instead of
//! running its own dispatch thread. One spawned task owns the handler and
//! drains an unbounded channel; the host runtime does the scheduling.
//!
//! ## Key Concepts
//! - Host: a caller-provided runtime [`Handle`], or a current-thread runtime
//!   owned by a dedicated thread (the looper-thread arrangement)
//! - Identity: the worker is the dispatch task, so `is_on_loop` compares tokio
//!   task ids rather than thread ids
//! - Quit safely: `shutdown` drops the only sender; the task drains what is
//!   queued, sees the channel close and ends

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use messageloop_api::{BoxedPayload, Handler, LoopError, LoopResult, LoopState, MessageLoop};
use tokio::runtime::{Builder, Handle};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{self, Id};
use tracing::{debug, error, info, trace, Instrument};
use uuid::Uuid;

use crate::thread::config::DEFAULT_THREAD_NAME_PREFIX;
use crate::thread::engine::panic_message;

type Posted<P> = (i32, Option<P>);

/// Receiver and handler, parked until the loop starts.
struct Pending<P> {
    receiver: UnboundedReceiver<Posted<P>>,
    handler: Box<dyn Handler<P>>,
}

/// Where the dispatch task runs.
#[derive(Debug)]
enum Host {
    Handle(Handle),
    Dedicated { thread_name: String },
}

enum Worker {
    Task(task::JoinHandle<LoopResult<()>>),
    Thread(std::thread::JoinHandle<LoopResult<()>>),
}

/// [`MessageLoop`] delegating dispatch to a tokio runtime.
pub struct RuntimeMessageLoop<P = BoxedPayload>
where
    P: Send + 'static,
{
    id: Uuid,
    host: Host,
    state: Arc<AtomicU8>,
    sender: RwLock<Option<UnboundedSender<Posted<P>>>>,
    pending: Arc<Mutex<Option<Pending<P>>>>,
    task_id: Arc<OnceLock<Id>>,
    worker: Mutex<Option<Worker>>,
}

impl<P> RuntimeMessageLoop<P>
where
    P: Send + 'static,
{
    /// Creates a loop running on its own current-thread runtime and thread.
    pub fn create<H>(handler: H) -> Self
    where
        H: Handler<P> + 'static,
    {
        let id = Uuid::new_v4();
        let thread_name = format!("{}-rt-{}", DEFAULT_THREAD_NAME_PREFIX, id.simple());
        Self::build(id, Host::Dedicated { thread_name }, Box::new(handler))
    }

    /// Creates a loop whose dispatch task is spawned on `handle`.
    pub fn with_handle<H>(handler: H, handle: Handle) -> Self
    where
        H: Handler<P> + 'static,
    {
        Self::build(Uuid::new_v4(), Host::Handle(handle), Box::new(handler))
    }

    fn build(id: Uuid, host: Host, handler: Box<dyn Handler<P>>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            id,
            host,
            state: Arc::new(AtomicU8::new(LoopState::PreStart.as_u8())),
            sender: RwLock::new(Some(sender)),
            pending: Arc::new(Mutex::new(Some(Pending { receiver, handler }))),
            task_id: Arc::new(OnceLock::new()),
            worker: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Waits until the dispatch task has drained the channel and ended.
    ///
    /// Returns `WorkerPanicked` if the handler panicked. Waiting twice is a
    /// no-op.
    pub async fn terminated(&self) -> LoopResult<()> {
        if self.is_on_loop() {
            return Err(LoopError::JoinFromLoop);
        }
        match self.state() {
            LoopState::PreStart => return Err(LoopError::NotStarted),
            LoopState::Started => return Err(LoopError::NotStopped),
            LoopState::Stopped => {}
        }

        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        match worker {
            Some(Worker::Task(handle)) => handle
                .await
                .unwrap_or_else(|err| Err(LoopError::WorkerPanicked(err.to_string()))),
            Some(Worker::Thread(handle)) => task::spawn_blocking(move || handle.join())
                .await
                .map_err(|err| LoopError::WorkerPanicked(err.to_string()))?
                .unwrap_or_else(|panic| Err(LoopError::WorkerPanicked(panic_message(&*panic)))),
            None => Ok(()),
        }
    }

    fn transition(&self, from: LoopState, to: LoopState) -> Result<(), LoopState> {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(LoopState::from_u8)
    }

    fn launch(&self, pending: Pending<P>) -> LoopResult<Worker> {
        let dispatch = dispatch(
            pending,
            Arc::clone(&self.state),
            Arc::clone(&self.task_id),
            self.id,
        )
        .instrument(crate::loop_span!("runtime", self.id));

        match &self.host {
            Host::Handle(handle) => {
                let join = handle.spawn(dispatch);
                let _ = self.task_id.set(join.id());
                Ok(Worker::Task(join))
            }
            Host::Dedicated { thread_name } => {
                let runtime = Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(|err| LoopError::SpawnFailed(err.to_string()))?;
                let thread = std::thread::Builder::new()
                    .name(thread_name.clone())
                    .spawn(move || {
                        runtime
                            .block_on(async move { task::spawn(dispatch).await })
                            .unwrap_or_else(|err| Err(LoopError::WorkerPanicked(err.to_string())))
                    })
                    .map_err(|err| LoopError::SpawnFailed(err.to_string()))?;
                Ok(Worker::Thread(thread))
            }
        }
    }
}

impl<P> MessageLoop<P> for RuntimeMessageLoop<P>
where
    P: Send + 'static,
{
    fn try_start(&self) -> LoopResult<()> {
        if let Err(current) = self.transition(LoopState::PreStart, LoopState::Started) {
            return current.start().map(|_| ());
        }

        let Some(pending) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return Err(LoopError::AlreadyStarted);
        };
        match self.launch(pending) {
            Ok(worker) => {
                *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(worker);
                info!(loop_id = %self.id, host = ?self.host, "runtime message loop started");
                Ok(())
            }
            Err(err) => {
                error!(loop_id = %self.id, "failed to launch dispatch task: {}", err);
                self.state.store(LoopState::Stopped.as_u8(), Ordering::Release);
                self.sender.write().unwrap_or_else(PoisonError::into_inner).take();
                Err(err)
            }
        }
    }

    fn try_post(&self, msg_type: i32, payload: Option<P>) -> LoopResult<()> {
        if let Err(err) = self.state().check_post() {
            trace!(loop_id = %self.id, msg_type, "post rejected: {}", err);
            return Err(err);
        }

        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => sender
                .send((msg_type, payload))
                .map_err(|_| LoopError::QueueClosed),
            None => Err(LoopError::Stopped),
        }
    }

    fn try_shutdown(&self) -> LoopResult<()> {
        if let Err(current) = self.transition(LoopState::Started, LoopState::Stopped) {
            return current.shutdown().map(|_| ());
        }
        self.sender.write().unwrap_or_else(PoisonError::into_inner).take();
        info!(loop_id = %self.id, "runtime message loop shutting down");
        Ok(())
    }

    fn is_on_loop(&self) -> bool {
        match (self.task_id.get(), task::try_id()) {
            (Some(loop_task), Some(current)) => *loop_task == current,
            _ => false,
        }
    }

    fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }
}

impl<P> Drop for RuntimeMessageLoop<P>
where
    P: Send + 'static,
{
    fn drop(&mut self) {
        if self.try_shutdown().is_ok() {
            debug!(loop_id = %self.id, "runtime message loop dropped while started");
        }
    }
}

impl<P> fmt::Debug for RuntimeMessageLoop<P>
where
    P: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeMessageLoop")
            .field("id", &self.id)
            .field("host", &self.host)
            .field("state", &self.state())
            .field("task_id", &self.task_id.get())
            .finish()
    }
}

/// Body of the dispatch task.
async fn dispatch<P>(
    pending: Pending<P>,
    state: Arc<AtomicU8>,
    task_id: Arc<OnceLock<Id>>,
    loop_id: Uuid,
) -> LoopResult<()>
where
    P: Send + 'static,
{
    let _ = task_id.set(task::id());
    let Pending {
        mut receiver,
        mut handler,
    } = pending;

    let mut dispatched: u64 = 0;
    while let Some((msg_type, payload)) = receiver.recv().await {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(msg_type, payload)));
        if let Err(panic) = outcome {
            let reason = panic_message(&*panic);
            error!(dispatched, "handler panicked, dispatch task exiting: {}", reason);
            state.store(LoopState::Stopped.as_u8(), Ordering::Release);
            return Err(LoopError::WorkerPanicked(reason));
        }
        dispatched += 1;
    }
    crate::log_lifecycle!("runtime", loop_id, "drained", dispatched);
    Ok(())
}
