#![doc = " Dedicated-thread message loop over a blocking queue."]

pub mod config;
pub mod engine;
pub mod error;
pub mod message;
pub mod pool;
pub mod queue;

// Re-export key types for easier usage
pub use config::{LoopConfig, DEFAULT_POOL_MAX_SIZE, DEFAULT_THREAD_NAME_PREFIX};
pub use engine::BlockingQueueMessageLoop;
pub use error::{QueueError, Rejected};
pub use message::{Envelope, Message};
pub use pool::MessagePool;
pub use queue::{BlockingQueue, FlumeQueue};
