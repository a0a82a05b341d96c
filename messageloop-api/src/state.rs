//! Lifecycle of a message loop.
//!
//! A loop moves through `PreStart -> Started -> Stopped` exactly once and never
//! backwards. The helpers here compute the outcome of each transition so every
//! implementation rejects the same calls with the same [`LoopError`].

use crate::errors::LoopError;

/// Lifecycle state of a message loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LoopState {
    /// Created, not started; posts are refused
    #[default]
    PreStart = 0,
    /// Worker running; posts are accepted
    Started = 1,
    /// Terminal; posts are refused and the worker drains then exits
    Stopped = 2,
}

impl LoopState {
    /// State a successful `start` moves to, or why it is refused.
    pub fn start(self) -> Result<LoopState, LoopError> {
        match self {
            LoopState::PreStart => Ok(LoopState::Started),
            LoopState::Started => Err(LoopError::AlreadyStarted),
            LoopState::Stopped => Err(LoopError::Stopped),
        }
    }

    /// State a successful `shutdown` moves to, or why it is refused.
    pub fn shutdown(self) -> Result<LoopState, LoopError> {
        match self {
            LoopState::Started => Ok(LoopState::Stopped),
            LoopState::PreStart => Err(LoopError::NotStarted),
            LoopState::Stopped => Err(LoopError::Stopped),
        }
    }

    /// Whether a post is accepted in this state, or why not.
    pub fn check_post(self) -> Result<(), LoopError> {
        match self {
            LoopState::Started => Ok(()),
            LoopState::PreStart => Err(LoopError::NotStarted),
            LoopState::Stopped => Err(LoopError::Stopped),
        }
    }

    pub fn is_started(self) -> bool {
        self == LoopState::Started
    }

    pub fn is_stopped(self) -> bool {
        self == LoopState::Stopped
    }

    /// Raw representation, for atomics.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`LoopState::as_u8`]. Unknown values read as `Stopped`.
    pub fn from_u8(raw: u8) -> LoopState {
        match raw {
            0 => LoopState::PreStart,
            1 => LoopState::Started,
            _ => LoopState::Stopped,
        }
    }
}
