//! # Message Pool
//!
//! A bounded free list of retired [`Message`]s, reused so that posting does not
//! allocate once the loop has warmed up.
//!
//! ## Key Concepts
//! - Intrusive list: retired messages are chained through their own `next` link
//! - Bound: the list never holds more than `max_size` messages; surplus releases
//!   are dropped so a burst of traffic does not pin memory afterwards
//! - Single owner: the pool is not synchronized itself; the engine mutates it
//!   only under the lock that also guards the lifecycle state

use std::fmt;

use super::message::{Envelope, Message};

/// Bounded, single-owner free list of messages.
pub struct MessagePool<P> {
    head: Option<Envelope<P>>,
    size: usize,
    max_size: usize,
}

impl<P> MessagePool<P> {
    /// Creates an empty pool retaining at most `max_size` messages.
    /// A bound of `0` disables recycling.
    pub fn new(max_size: usize) -> Self {
        Self {
            head: None,
            size: 0,
            max_size,
        }
    }

    /// Returns a detached message carrying `msg_type` and `payload`, recycled
    /// from the free list when one is available.
    pub fn obtain(&mut self, msg_type: i32, payload: Option<P>) -> Envelope<P> {
        match self.head.take() {
            Some(mut message) => {
                self.head = message.next.take();
                self.size -= 1;
                message.fill(msg_type, payload);
                message
            }
            None => Box::new(Message::new(msg_type, payload)),
        }
    }

    /// Resets `message` and keeps it for reuse if the pool is below its bound.
    /// Returns whether the message was retained.
    pub fn release(&mut self, mut message: Envelope<P>) -> bool {
        message.reset();
        if self.size >= self.max_size {
            return false;
        }
        message.next = self.head.take();
        self.head = Some(message);
        self.size += 1;
        true
    }

    /// Number of messages currently retained.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<P> Drop for MessagePool<P> {
    fn drop(&mut self) {
        // Unlink iteratively so a long list does not recurse through Box drops.
        let mut next = self.head.take();
        while let Some(mut message) = next {
            next = message.next.take();
        }
    }
}

impl<P> fmt::Debug for MessagePool<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagePool")
            .field("size", &self.size)
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obtain_from_empty_pool_allocates_populated_message() {
        let mut pool: MessagePool<&str> = MessagePool::new(4);
        let message = pool.obtain(3, Some("a"));
        assert_eq!(message.msg_type(), 3);
        assert_eq!(message.payload(), Some(&"a"));
        assert!(!message.is_linked());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_obtain_reuses_released_message() {
        let mut pool: MessagePool<&str> = MessagePool::new(4);
        let first = pool.obtain(1, Some("a"));
        let address = &*first as *const Message<&str>;
        assert!(pool.release(first));
        assert_eq!(pool.len(), 1);

        let second = pool.obtain(2, Some("b"));
        assert_eq!(&*second as *const Message<&str>, address);
        assert_eq!(second.msg_type(), 2);
        assert_eq!(second.payload(), Some(&"b"));
        assert!(!second.is_linked());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_release_resets_fields() {
        let mut pool: MessagePool<String> = MessagePool::new(1);
        let message = pool.obtain(9, Some("payload".to_string()));
        pool.release(message);

        let recycled = pool.obtain(5, None);
        assert_eq!(recycled.msg_type(), 5);
        assert!(recycled.payload().is_none());
    }

    #[test]
    fn test_zero_bound_disables_recycling() {
        let mut pool: MessagePool<u32> = MessagePool::new(0);
        let message = pool.obtain(1, Some(1));
        assert!(!pool.release(message));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_recycling_continues_after_pool_fills() {
        let mut pool: MessagePool<u32> = MessagePool::new(2);
        for round in 0..10 {
            let a = pool.obtain(round, None);
            let b = pool.obtain(round, None);
            let c = pool.obtain(round, None);
            pool.release(a);
            pool.release(b);
            pool.release(c);
            assert_eq!(pool.len(), 2);
        }
    }
}
