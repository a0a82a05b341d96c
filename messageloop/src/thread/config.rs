use messageloop_api::LoopError;

/// Number of retired messages an engine keeps for reuse unless configured otherwise.
pub const DEFAULT_POOL_MAX_SIZE: usize = 50;

/// Worker thread name prefix; the loop id is appended to it.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "messageloop-worker";

/// Configuration for a `BlockingQueueMessageLoop`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    /// Upper bound of the message pool. `0` disables recycling.
    pub pool_max_size: usize,

    /// Bound of the default queue. `None` builds an unbounded queue.
    /// Ignored when the engine is given its own queue.
    pub queue_capacity: Option<usize>,

    /// Prefix of the worker thread name; the loop id is appended.
    pub thread_name_prefix: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            queue_capacity: None,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl LoopConfig {
    /// Checks values that cannot produce a working loop.
    pub fn validate(&self) -> Result<(), LoopError> {
        if self.queue_capacity == Some(0) {
            return Err(LoopError::InvalidConfig(
                "queue_capacity must be greater than zero".to_string(),
            ));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(LoopError::InvalidConfig(
                "thread_name_prefix must not contain NUL bytes".to_string(),
            ));
        }
        Ok(())
    }

    /// Worker thread name for the loop identified by `id`.
    pub fn thread_name(&self, id: &uuid::Uuid) -> String {
        format!("{}-{}", self.thread_name_prefix, id.simple())
    }
}
