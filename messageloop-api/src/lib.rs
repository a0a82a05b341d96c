//! # Message Loop API
//!
//! The public contract shared by every message loop implementation: a single
//! logical loop that owns one worker, accepts typed messages from any thread
//! and hands them, one at a time and in submission order, to a [`Handler`].
//!
//! ## Core Components
//!
//! - **MessageLoop**: lifecycle (`start` / `shutdown`), posting and worker identity
//! - **Handler**: the callback invoked once per dispatched message, on the worker only
//! - **LoopState**: the one-directional `PreStart -> Started -> Stopped` lifecycle
//! - **LoopError**: the reason a `try_*` operation was rejected
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use messageloop_api::{MessageLoop, Handler};
//!
//! fn drive(event_loop: &impl MessageLoop<&'static str>) {
//!     assert!(event_loop.start());
//!     assert!(event_loop.post(7, Some("x")));
//!     assert!(event_loop.shutdown());
//!     assert!(!event_loop.post(8, Some("y")));
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`message_loop`]: the `MessageLoop` and `Handler` traits
//! - [`state`]: lifecycle state machine
//! - [`errors`]: rejection reasons
//! - [`types`]: payload aliases

pub mod errors;
pub mod message_loop;
pub mod state;
pub mod types;

pub use errors::LoopError;
pub use message_loop::{Handler, MessageLoop};
pub use state::LoopState;
pub use types::{BoxedPayload, LoopResult, UNSET_MESSAGE_TYPE};
