//! Message loop delegating its dispatch to a tokio runtime.

mod looper;

pub use looper::RuntimeMessageLoop;
