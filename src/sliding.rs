//! Fixed-capacity sliding window over a caller-provided buffer.
//!
//! Backs both the raw sample window and the smoothing histories, so all of
//! the wraparound index arithmetic lives in this one place.

use core::marker::PhantomData;

pub struct SlidingWindow<T, C> {
    buffer: C,
    cursor: usize,
    full: bool,
    _marker: PhantomData<T>,
}

impl<T: Default + Copy, const N: usize> Default for SlidingWindow<T, [T; N]> {
    fn default() -> Self {
        Self::new([T::default(); N])
    }
}

impl<T, C> SlidingWindow<T, C>
where
    T: Copy,
    C: AsRef<[T]> + AsMut<[T]>,
{
    pub fn new(buffer: C) -> Self {
        Self {
            buffer,
            cursor: 0,
            full: false,
            _marker: PhantomData,
        }
    }

    /// Forgets all stored samples without touching the backing storage.
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.full = false;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().len()
    }

    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            self.cursor
        }
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// The most recently pushed sample, if any.
    pub fn last(&self) -> Option<T> {
        if self.cursor == 0 && !self.full {
            return None;
        }

        let newest = if self.cursor == 0 {
            self.capacity() - 1
        } else {
            self.cursor - 1
        };
        Some(self.buffer.as_ref()[newest])
    }

    /// Stores `sample`, returning the evicted oldest sample once the window
    /// is at capacity.
    pub fn push(&mut self, sample: T) -> Option<T> {
        let buffer = self.buffer.as_mut();
        let evicted = self.full.then_some(buffer[self.cursor]);

        buffer[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % buffer.len();
        if self.cursor == 0 {
            self.full = true;
        }

        evicted
    }

    /// Iterates over the stored samples in storage order, which is generally
    /// not insertion order. Sufficient for order-independent statistics.
    pub fn iter_unordered(&self) -> impl Iterator<Item = T> + Clone + '_ {
        (0..self.len()).map(|i| self.buffer.as_ref()[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partially_filled_window() {
        let mut window = SlidingWindow::new([0u32; 4]);

        assert!(window.is_empty());
        assert_eq!(window.last(), None);

        assert_eq!(window.push(1), None);
        assert_eq!(window.push(2), None);

        assert_eq!(window.len(), 2);
        assert!(!window.is_full());
        assert_eq!(window.last(), Some(2));
    }

    #[test]
    fn full_window_evicts_oldest_and_keeps_capacity() {
        let mut window = SlidingWindow::new([0u32; 3]);

        window.push(1);
        window.push(2);
        assert_eq!(window.push(3), None);
        assert!(window.is_full());

        // Every further push evicts the oldest retained sample.
        assert_eq!(window.push(4), Some(1));
        assert_eq!(window.push(5), Some(2));

        assert_eq!(window.len(), window.capacity());
        assert_eq!(window.last(), Some(5));
    }

    #[test]
    fn last_is_always_the_newest_push() {
        let mut window = SlidingWindow::new([0u32; 3]);

        for i in 1..=10 {
            window.push(i);
            assert_eq!(window.last(), Some(i));
        }
    }

    #[test]
    fn clear_resets_length() {
        let mut window = SlidingWindow::new([0u32; 3]);

        window.push(1);
        window.push(2);
        window.push(3);
        window.push(4);
        window.clear();

        assert!(window.is_empty());
        assert_eq!(window.last(), None);
        assert_eq!(window.push(7), None);
    }
}
