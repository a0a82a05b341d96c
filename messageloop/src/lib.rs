// Message loop implementations
//
// This crate implements the `messageloop-api` contract: a single-consumer loop
// that serializes work posted from any thread onto one worker.
//
// - `thread`: the blocking-queue engine with its own worker thread and message pool
// - `runtime`: a variant that hands dispatch to a tokio runtime
// - `logging`: tracing subscriber setup shared by applications using the loops

pub mod logging;
pub mod runtime;
pub mod thread;

// Re-export commonly used types
pub use messageloop_api::{BoxedPayload, Handler, LoopError, LoopResult, LoopState, MessageLoop};
pub use runtime::RuntimeMessageLoop;
pub use thread::{BlockingQueueMessageLoop, LoopConfig};
