/// Fixed-capacity ring buffer of recent samples
///
/// Writes are O(1) and overwrite the oldest sample once the buffer is full.
/// `to_vec` always returns samples oldest to newest, independent of where
/// the write head currently sits.
#[derive(Debug, Clone)]
pub struct SignalBuffer {
    buffer: Vec<f64>,
    head: usize,
    count: usize,
}

impl SignalBuffer {
    /// Create an empty buffer holding at most `capacity` samples
    ///
    /// A zero capacity is bumped to 1 so that `add` stays total.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            head: 0,
            count: 0,
        }
    }

    /// Append a sample, overwriting the oldest one when full
    pub fn add(&mut self, value: f64) {
        self.buffer[self.head] = value;
        self.head = (self.head + 1) % self.buffer.len();
        if self.count < self.buffer.len() {
            self.count += 1;
        }
    }

    /// Samples in chronological order (oldest to newest)
    pub fn to_vec(&self) -> Vec<f64> {
        let capacity = self.buffer.len();
        let start = if self.count < capacity { 0 } else { self.head };
        (0..self.count)
            .map(|i| self.buffer[(start + i) % capacity])
            .collect()
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_full(&self) -> bool {
        self.count == self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_in_order() {
        let mut buffer = SignalBuffer::new(4);
        assert!(buffer.is_empty());
        buffer.add(1.0);
        buffer.add(2.0);
        assert_eq!(buffer.len(), 2);
        assert!(!buffer.is_full());
        assert_eq!(buffer.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_wraparound_keeps_latest_in_push_order() {
        let capacity = 5;
        let mut buffer = SignalBuffer::new(capacity);
        for k in 1..=3 {
            buffer.clear();
            let pushed: Vec<f64> = (0..capacity + k).map(|v| v as f64 * 1.5).collect();
            for &v in &pushed {
                buffer.add(v);
            }
            assert_eq!(buffer.len(), capacity);
            assert!(buffer.is_full());
            assert_eq!(buffer.to_vec(), pushed[k..].to_vec());
        }
    }

    #[test]
    fn test_clear_resets() {
        let mut buffer = SignalBuffer::new(3);
        for v in 0..7 {
            buffer.add(v as f64);
        }
        buffer.clear();
        assert_eq!(buffer.len(), 0);
        assert!(buffer.to_vec().is_empty());
        buffer.add(9.0);
        assert_eq!(buffer.to_vec(), vec![9.0]);
    }
}
