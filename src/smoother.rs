// src/smoother.rs
//
// Fixed-window running average for a noisy derivative signal.
//
// While the buffer is filling, the divisor is the number of readings
// pushed so far; once full, the oldest reading is evicted and the divisor
// is pinned at the window capacity. Cleared on episode restart so stale
// readings never straddle a discontinuity.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RunningAverage {
    buffer: VecDeque<f64>,
    capacity: usize,
    count: usize,
}

impl RunningAverage {
    /// Create a smoother with the given window capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Push a raw reading and return the smoothed value.
    pub fn push(&mut self, reading: f64) -> f64 {
        if self.buffer.len() < self.capacity {
            self.buffer.push_back(reading);
            self.count += 1;
        } else {
            self.count = self.capacity;
            self.buffer.pop_front();
            self.buffer.push_back(reading);
        }
        self.buffer.iter().sum::<f64>() / self.count as f64
    }

    /// Empty the buffer and reset the fill counter. Used on episode
    /// restart.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.count = 0;
    }
}
