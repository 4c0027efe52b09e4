//! Fixed-capacity FIFO window
//!
//! Backs every rolling statistic in the engine: append at the back, evict
//! from the front once the capacity is exceeded, O(1) both ways.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A bounded FIFO window over recent values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingWindow<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        RollingWindow {
            capacity,
            values: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a value, evicting the oldest once over capacity
    pub fn push(&mut self, value: T) {
        self.values.push_back(value);
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent value
    pub fn back(&self) -> Option<&T> {
        self.values.back()
    }

    /// Value `n` entries before the most recent one
    pub fn nth_back(&self, n: usize) -> Option<&T> {
        if n >= self.values.len() {
            return None;
        }
        self.values.get(self.values.len() - 1 - n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl RollingWindow<f64> {
    /// Mean over the window, 0.0 when empty
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_exceeds_capacity() {
        let mut window = RollingWindow::new(10);
        for i in 0..500 {
            window.push(i as f64);
            assert!(window.len() <= 10);
        }
        assert_eq!(window.len(), 10);
    }

    #[test]
    fn test_fifo_eviction_order() {
        let mut window = RollingWindow::new(3);
        for i in 1..=5 {
            window.push(i);
        }
        let remaining: Vec<i32> = window.iter().copied().collect();
        assert_eq!(remaining, vec![3, 4, 5]);
        assert_eq!(window.back(), Some(&5));
        assert_eq!(window.capacity(), 3);
    }

    #[test]
    fn test_mean_empty_is_zero() {
        let window: RollingWindow<f64> = RollingWindow::new(10);
        assert_eq!(window.mean(), 0.0);
    }

    #[test]
    fn test_mean() {
        let mut window = RollingWindow::new(10);
        window.push(1.0);
        window.push(2.0);
        window.push(6.0);
        assert!((window.mean() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_nth_back() {
        let mut window = RollingWindow::new(5);
        for i in 1..=5 {
            window.push(i);
        }
        assert_eq!(window.nth_back(0), Some(&5));
        assert_eq!(window.nth_back(4), Some(&1));
        assert_eq!(window.nth_back(5), None);
    }

    #[test]
    fn test_clear() {
        let mut window = RollingWindow::new(3);
        window.push(1.0);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.mean(), 0.0);
    }
}
