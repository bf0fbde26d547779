use heapless::Deque;

/// Fixed-capacity FIFO.
///
/// A push on a full buffer is rejected and leaves the buffer unchanged: nothing is overwritten.
#[derive(Debug)]
pub struct RingBuffer<T, const N: usize> {
    items: Deque<T, N>,
}

impl<T, const N: usize> RingBuffer<T, N> {
    pub const fn new() -> Self {
        Self {
            items: Deque::new(),
        }
    }

    /// Appends an item at the back.
    ///
    /// # Returns
    /// - `true` if the item was stored.
    /// - `false` if the buffer was full. The item is dropped.
    pub fn push(&mut self, p_item: T) -> bool {
        self.items.push_back(p_item).is_ok()
    }

    /// Removes and returns the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns the oldest item without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items that can still be pushed.
    pub fn free(&self) -> usize {
        N - self.items.len()
    }

    /// Discards every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates from the oldest to the newest item.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{K_QUEUE_SIZE, Payload};

    fn payload(p_text: &str) -> Payload {
        let mut l_p = Payload::new();
        l_p.push_str(p_text).unwrap();
        l_p
    }

    #[test]
    fn test_fifo_order() {
        let mut l_ring: RingBuffer<u32, 8> = RingBuffer::new();
        for l_i in 0..8 {
            assert!(l_ring.push(l_i));
        }
        for l_i in 0..8 {
            assert_eq!(l_ring.pop(), Some(l_i));
        }
        assert!(l_ring.is_empty());
        assert_eq!(l_ring.pop(), None);
    }

    #[test]
    fn test_push_on_full_queue_is_dropped() {
        let mut l_ring: RingBuffer<Payload, K_QUEUE_SIZE> = RingBuffer::new();
        for l_i in 0..K_QUEUE_SIZE {
            assert!(l_ring.push(payload(std::format!("-print {}", l_i).as_str())));
        }
        assert_eq!(l_ring.free(), 0);

        assert!(!l_ring.push(payload("-print overflow")));
        assert_eq!(l_ring.len(), K_QUEUE_SIZE);
        assert_eq!(l_ring.peek().map(|l_p| l_p.as_str()), Some("-print 0"));
        assert!(l_ring.iter().all(|l_p| l_p.as_str() != "-print overflow"));
    }

    #[test]
    fn test_wraps_around() {
        let mut l_ring: RingBuffer<u8, 3> = RingBuffer::new();
        for l_round in 0..10u8 {
            assert!(l_ring.push(l_round));
            assert!(l_ring.push(l_round.wrapping_add(100)));
            assert_eq!(l_ring.pop(), Some(l_round));
            assert_eq!(l_ring.pop(), Some(l_round.wrapping_add(100)));
        }
        assert!(l_ring.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut l_ring: RingBuffer<u8, 4> = RingBuffer::new();
        l_ring.push(1);
        l_ring.push(2);
        assert_eq!(l_ring.free(), 2);
        l_ring.clear();
        assert!(l_ring.is_empty());
        assert!(l_ring.peek().is_none());
    }
}
