use std::fmt;

use messageloop_api::UNSET_MESSAGE_TYPE;

/// Recyclable envelope for one posted `(msg_type, payload)` pair.
///
/// `next` links retired messages inside a [`MessagePool`](super::pool::MessagePool)
/// and is `None` for every message outside of it.
pub struct Message<P> {
    pub(crate) msg_type: i32,
    pub(crate) payload: Option<P>,
    pub(crate) next: Option<Box<Message<P>>>,
}

/// A message in flight between a producer and the worker.
pub type Envelope<P> = Box<Message<P>>;

impl<P> Message<P> {
    pub fn new(msg_type: i32, payload: Option<P>) -> Self {
        Self {
            msg_type,
            payload,
            next: None,
        }
    }

    pub fn msg_type(&self) -> i32 {
        self.msg_type
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Whether the message is linked into a free list.
    pub fn is_linked(&self) -> bool {
        self.next.is_some()
    }

    /// Moves the contents out, leaving the message reset.
    pub fn take(&mut self) -> (i32, Option<P>) {
        let msg_type = std::mem::replace(&mut self.msg_type, UNSET_MESSAGE_TYPE);
        (msg_type, self.payload.take())
    }

    pub(crate) fn fill(&mut self, msg_type: i32, payload: Option<P>) {
        self.msg_type = msg_type;
        self.payload = payload;
    }

    pub(crate) fn reset(&mut self) {
        self.msg_type = UNSET_MESSAGE_TYPE;
        self.payload = None;
    }
}

impl<P> Default for Message<P> {
    fn default() -> Self {
        Self::new(UNSET_MESSAGE_TYPE, None)
    }
}

impl<P> fmt::Debug for Message<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("msg_type", &self.msg_type)
            .field("has_payload", &self.payload.is_some())
            .field("linked", &self.next.is_some())
            .finish()
    }
}
