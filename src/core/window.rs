//! Bounded FIFO sample windows.
//!
//! Per-sensor runtime state keeps fixed-size windows of recent observations
//! (telemetry samples, accuracy observations). Pushing beyond capacity
//! evicts the oldest entry.

use std::collections::VecDeque;

/// A bounded FIFO window over observations of type `T`.
#[derive(Debug, Clone)]
pub struct SampleWindow<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T> SampleWindow<T> {
    /// Create a window holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push an observation, evicting the oldest when full.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(item);
    }

    /// Number of buffered observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the window is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Maximum number of observations the window holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed observation.
    #[inline]
    pub fn latest(&self) -> Option<&T> {
        self.buf.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }

    /// Drop all buffered observations.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
