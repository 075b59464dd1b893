use std::collections::VecDeque;

use crate::types::Sample;

/// Roughly one second of history at 60 frames per second.
pub const WINDOW_CAPACITY: usize = 60;

/// Append-only rolling history. The oldest sample is evicted once full.
#[derive(Clone, Debug)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }
}

impl SampleWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `sample`, returning the evicted one if the window was full.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// Smallest and largest `value` currently held.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.samples.iter().fold(None, |acc, s| match acc {
            None => Some((s.value, s.value)),
            Some((lo, hi)) => Some((lo.min(s.value), hi.max(s.value))),
        })
    }

    pub fn mean_value(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().map(|s| s.value).sum::<f64>() / self.samples.len() as f64)
    }
}
