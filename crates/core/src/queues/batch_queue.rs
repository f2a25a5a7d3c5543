/// FIFO buffer with a soft size threshold.
///
/// The queue never refuses an item: `push` reports when the threshold is
/// reached and the owner is expected to drain it right away with `take`.
pub struct BatchQueue<T> {
    items: Vec<T>,
    threshold: usize,
}

impl<T> BatchQueue<T> {
    pub fn new(threshold: usize) -> Self {
        assert!(threshold > 0);

        Self {
            items: Vec::with_capacity(threshold),
            threshold,
        }
    }

    /// Appends `item` and returns `true` if the queue is now full.
    pub fn push(&mut self, item: T) -> bool {
        self.items.push(item);
        self.items.len() >= self.threshold
    }

    /// Drains everything in insertion order, leaving the queue empty.
    pub fn take(&mut self) -> Vec<T> {
        std::mem::replace(&mut self.items, Vec::with_capacity(self.threshold))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
