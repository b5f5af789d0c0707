//! Single-writer snapshot cell.
//!
//! The writer builds a complete value and swaps it in as one `Arc`; readers
//! clone the current `Arc` and keep a consistent view for as long as they hold
//! it. The lock only ever guards a pointer swap or clone.

use parking_lot::RwLock;
use std::sync::Arc;

pub struct SnapshotCell<T> {
    current: RwLock<Arc<T>>,
}

impl<T> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Replaces the published value.
    pub fn publish(&self, value: T) {
        let next = Arc::new(value);
        *self.current.write() = next;
    }

    /// Returns the latest published value.
    pub fn load(&self) -> Arc<T> {
        Arc::clone(&self.current.read())
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_reader_keeps_its_snapshot() {
        let cell = SnapshotCell::new((1, 1));
        let before = cell.load();
        cell.publish((2, 2));
        assert_eq!(*before, (1, 1));
        assert_eq!(*cell.load(), (2, 2));
    }

    #[test]
    fn test_concurrent_reads_never_tear() {
        let cell = Arc::new(SnapshotCell::new((0u64, 0u64)));
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 1..=10_000u64 {
                    cell.publish((i, i * 2));
                }
            })
        };
        for _ in 0..10_000 {
            let (a, b) = *cell.load();
            assert_eq!(b, a * 2);
        }
        writer.join().unwrap();
        assert_eq!(*cell.load(), (10_000, 20_000));
    }
}
