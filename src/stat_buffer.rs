// Telenode — Sliding-window statistics buffer
//
// Fixed-depth ring buffer: feeding at capacity overwrites the oldest sample.
// There is no clear; windows slide as new samples arrive.

use std::cmp::Ordering;

/// Numeric sample type storable in a [`StatBuffer`].
pub trait Sample: Copy + PartialOrd + Default {
    fn to_f32(self) -> f32;
}

impl Sample for f32 {
    fn to_f32(self) -> f32 {
        self
    }
}

impl Sample for u8 {
    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Sample for i32 {
    fn to_f32(self) -> f32 {
        self as f32
    }
}

#[derive(Debug, Clone)]
pub struct StatBuffer<T: Sample, const N: usize> {
    samples: [T; N],
    /// Slot the next sample is written to.
    head: usize,
    len: usize,
}

impl<T: Sample, const N: usize> StatBuffer<T, N> {
    const NON_ZERO: () = assert!(N > 0, "StatBuffer capacity must be non-zero");

    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;
        Self {
            samples: [T::default(); N],
            head: 0,
            len: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn feed(&mut self, value: T) {
        self.samples[self.head] = value;
        self.head = (self.head + 1) % N;
        if self.len < N {
            self.len += 1;
        }
    }

    /// Held samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let start = (self.head + N - self.len) % N;
        (0..self.len).map(move |i| self.samples[(start + i) % N])
    }

    pub fn average(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let sum: f32 = self.iter().map(Sample::to_f32).sum();
        Some(sum / self.len as f32)
    }

    /// Median of a sorted copy; even counts yield the lower-middle element.
    pub fn median(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let mut sorted = self.samples;
        let held = &mut sorted[..self.len];
        held.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Some(held[(self.len - 1) / 2])
    }
}

impl<T: Sample, const N: usize> Default for StatBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(values: &[f32]) -> f32 {
        values.iter().sum::<f32>() / values.len() as f32
    }

    #[test]
    fn empty_buffer_has_no_data() {
        let buffer: StatBuffer<f32, 4> = StatBuffer::new();
        assert_eq!(buffer.average(), None);
        assert_eq!(buffer.median(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn partial_fill_uses_only_fed_samples() {
        let mut buffer: StatBuffer<f32, 8> = StatBuffer::new();
        buffer.feed(3.0);
        buffer.feed(4.0);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.average(), Some(3.5));
        // lower-middle of [3, 4]
        assert_eq!(buffer.median(), Some(3.0));
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut buffer: StatBuffer<f32, 3> = StatBuffer::new();
        for v in [10.0, 1.0, 2.0, 3.0] {
            buffer.feed(v);
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(buffer.average(), Some(2.0));
    }

    #[test]
    fn sliding_statistics_match_last_window() {
        let mut buffer: StatBuffer<f32, 5> = StatBuffer::new();
        let fed: Vec<f32> = (0..23).map(|i| ((i * 7) % 11) as f32 - 3.5).collect();

        for (n, v) in fed.iter().enumerate() {
            buffer.feed(*v);

            let start = (n + 1).saturating_sub(5);
            let window = &fed[start..=n];
            let avg = buffer.average().unwrap();
            assert!((avg - mean(window)).abs() < 1e-4, "step {n}");

            let mut sorted = window.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(buffer.median(), Some(sorted[(sorted.len() - 1) / 2]));
        }
    }

    #[test]
    fn integer_median_over_face_codes() {
        let mut buffer: StatBuffer<u8, 3> = StatBuffer::new();
        buffer.feed(4);
        buffer.feed(1);
        buffer.feed(4);
        assert_eq!(buffer.median(), Some(4));

        buffer.feed(1);
        // window is now [1, 4, 1]
        assert_eq!(buffer.median(), Some(1));
        assert_eq!(buffer.average(), Some(2.0));
    }

    #[test]
    fn median_does_not_reorder_storage() {
        let mut buffer: StatBuffer<i32, 4> = StatBuffer::new();
        for v in [9, -2, 5] {
            buffer.feed(v);
        }
        assert_eq!(buffer.median(), Some(5));
        assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![9, -2, 5]);
        assert_eq!(buffer.capacity(), 4);
    }
}
