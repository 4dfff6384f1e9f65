//! Fixed-capacity FIFO buffer with overwrite-on-full semantics.
//!
//! Storage is allocated once at construction. Head and count indices are
//! advanced with modular arithmetic so push, pop and indexed access are all
//! O(1) regardless of capacity.

/// Errors reported by [`RingBuffer`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A buffer was requested with zero capacity.
    InvalidCapacity,
    /// `pop` was called on an empty buffer.
    Empty,
    /// `element` was called with an index outside `0..count`.
    IndexOutOfRange { index: usize, count: usize },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::InvalidCapacity => write!(f, "Buffer capacity must be positive"),
            BufferError::Empty => write!(f, "Buffer is empty"),
            BufferError::IndexOutOfRange { index, count } => {
                write!(f, "Index {index} out of range for buffer of {count} elements")
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// A circular buffer holding at most `capacity` elements.
///
/// When full, `push` evicts the oldest element instead of rejecting the new
/// one, so `count() == capacity()` holds from then on.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    count: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer with a fixed capacity.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::InvalidCapacity);
        }

        let slots = std::iter::repeat_with(|| None).take(capacity).collect();
        Ok(Self {
            slots,
            head: 0,
            count: 0,
        })
    }

    /// Append a value, evicting the oldest element if the buffer is full.
    pub fn push(&mut self, value: T) {
        let capacity = self.capacity();
        if self.is_full() {
            self.head = (self.head + 1) % capacity;
        } else {
            self.count += 1;
        }
        let tail = (self.head + self.count - 1) % capacity;
        self.slots[tail] = Some(value);
    }

    /// Remove and return the oldest element.
    pub fn pop(&mut self) -> Result<T, BufferError> {
        if self.is_empty() {
            return Err(BufferError::Empty);
        }

        let value = self.slots[self.head].take().ok_or(BufferError::Empty)?;
        self.head = (self.head + 1) % self.capacity();
        self.count -= 1;
        Ok(value)
    }

    /// Get the `index`-th oldest live element without removing it.
    pub fn element(&self, index: usize) -> Result<&T, BufferError> {
        if index >= self.count {
            return Err(BufferError::IndexOutOfRange {
                index,
                count: self.count,
            });
        }

        let slot = (self.head + index) % self.capacity();
        self.slots[slot]
            .as_ref()
            .ok_or(BufferError::IndexOutOfRange {
                index,
                count: self.count,
            })
    }

    /// The most recently pushed element, if any.
    pub fn latest(&self) -> Option<&T> {
        self.count
            .checked_sub(1)
            .and_then(|last| self.element(last).ok())
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.count).filter_map(move |i| self.element(i).ok())
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let result = RingBuffer::<f64>::new(0);
        assert_eq!(result.unwrap_err(), BufferError::InvalidCapacity);
    }

    #[test]
    fn test_push_until_full() {
        let mut buffer = RingBuffer::new(3).unwrap();
        assert!(buffer.is_empty());

        buffer.push(1);
        buffer.push(2);
        assert_eq!(buffer.count(), 2);
        assert!(!buffer.is_full());

        buffer.push(3);
        assert!(buffer.is_full());
        assert_eq!(buffer.count(), 3);
    }

    #[test]
    fn test_overwrite_keeps_oldest_survivor() {
        let capacity = 5;
        let mut buffer = RingBuffer::new(capacity).unwrap();

        for pushed in 1..=23 {
            buffer.push(pushed);
            if pushed > capacity {
                assert_eq!(buffer.count(), capacity);
                // Oldest survivor is the (pushed - capacity + 1)-th value
                assert_eq!(*buffer.element(0).unwrap(), pushed - capacity + 1);
                assert_eq!(*buffer.latest().unwrap(), pushed);
            }
        }

        let contents: Vec<usize> = buffer.iter().copied().collect();
        assert_eq!(contents, vec![19, 20, 21, 22, 23]);
    }

    #[test]
    fn test_pop_after_exactly_capacity_pushes() {
        let mut buffer = RingBuffer::new(4).unwrap();
        for v in [10.0, 20.0, 30.0, 40.0] {
            buffer.push(v);
        }

        assert_eq!(buffer.pop().unwrap(), 10.0);
        assert_eq!(buffer.count(), 3);
        assert_eq!(*buffer.element(0).unwrap(), 20.0);
    }

    #[test]
    fn test_pop_empty_is_error() {
        let mut buffer = RingBuffer::<f64>::new(2).unwrap();
        assert_eq!(buffer.pop().unwrap_err(), BufferError::Empty);

        buffer.push(1.0);
        assert_eq!(buffer.pop().unwrap(), 1.0);
        assert_eq!(buffer.pop().unwrap_err(), BufferError::Empty);
    }

    #[test]
    fn test_element_out_of_range() {
        let mut buffer = RingBuffer::new(3).unwrap();
        buffer.push('a');

        assert_eq!(
            buffer.element(1).unwrap_err(),
            BufferError::IndexOutOfRange { index: 1, count: 1 }
        );
        // Capacity does not make an unfilled slot addressable
        assert!(buffer.element(2).is_err());
    }

    #[test]
    fn test_interleaved_push_pop_wraps() {
        let mut buffer = RingBuffer::new(3).unwrap();
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        assert_eq!(buffer.pop().unwrap(), 1);
        buffer.push(4);
        buffer.push(5);

        let contents: Vec<i32> = buffer.iter().copied().collect();
        assert_eq!(contents, vec![3, 4, 5]);
        assert_eq!(*buffer.element(2).unwrap(), 5);
    }

    #[test]
    fn test_error_display() {
        let err = BufferError::IndexOutOfRange { index: 7, count: 2 };
        assert_eq!(
            err.to_string(),
            "Index 7 out of range for buffer of 2 elements"
        );
    }
}
