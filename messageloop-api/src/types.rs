use crate::errors::LoopError;
use std::any::Any;

// Type aliases for common types
pub type BoxedPayload = Box<dyn Any + Send>;
pub type LoopResult<T> = Result<T, LoopError>;

/// Message type carried by a message that holds no posted value.
pub const UNSET_MESSAGE_TYPE: i32 = -1;
