//! Running mean of the sample-to-sample change rate.
//!
//! Every magnitude after the first yields one delta `|m[n] - m[n-1]|`. The
//! most recent `window_capacity` deltas form the window whose arithmetic mean
//! is maintained incrementally in O(1) per sample.
//!
//! While the window is filling, the exact growing-window recurrence
//! `(mean * n + delta) / (n + 1)` is used. Once the window is full, the
//! evicted delta is swapped out with `mean += (delta - evicted) / capacity`.
//! The eviction step always divides by the fixed capacity; that is exact only
//! at steady state, which is the only state in which it runs.

use crate::core::ring_buffer::{BufferError, RingBuffer};

/// Incremental estimator for the mean absolute change between magnitudes.
#[derive(Debug, Clone)]
pub struct ChangeRateTracker {
    /// Recent magnitudes; only the newest is read back
    history: RingBuffer<f64>,
    /// Sliding window of absolute deltas
    window: RingBuffer<f64>,
    /// Mean of the deltas currently in `window`
    current_mean: f64,
}

impl ChangeRateTracker {
    /// Create a tracker whose delta window holds `window_capacity` values.
    pub fn new(window_capacity: usize) -> Result<Self, BufferError> {
        Ok(Self {
            history: RingBuffer::new(window_capacity)?,
            window: RingBuffer::new(window_capacity)?,
            current_mean: 0.0,
        })
    }

    /// Feed the next magnitude and return the updated mean change rate.
    ///
    /// The first magnitude has no predecessor, so it produces no delta and
    /// leaves the mean at 0. Non-finite magnitudes propagate into the mean.
    pub fn update(&mut self, magnitude: f64) -> Result<f64, BufferError> {
        if let Some(&last) = self.history.latest() {
            let delta = (magnitude - last).abs();

            if self.window.is_full() {
                let evicted = self.window.pop()?;
                self.current_mean += (delta - evicted) / self.window.capacity() as f64;
            } else {
                let n = self.window.count() as f64;
                self.current_mean = (self.current_mean * n + delta) / (n + 1.0);
            }

            self.window.push(delta);
        }

        self.history.push(magnitude);
        Ok(self.current_mean)
    }

    /// Current mean of the delta window.
    pub fn current_mean(&self) -> f64 {
        self.current_mean
    }

    /// Most recent magnitude fed to the tracker.
    pub fn last_magnitude(&self) -> Option<f64> {
        self.history.latest().copied()
    }

    /// Deltas currently in the window, oldest first.
    pub fn deltas(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().copied()
    }

    /// Number of deltas currently in the window.
    pub fn window_len(&self) -> usize {
        self.window.count()
    }

    pub fn window_capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Whether the window has reached steady state.
    pub fn is_warmed_up(&self) -> bool {
        self.window.is_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::statistics::Statistics;

    const TOLERANCE: f64 = 1e-9;

    fn feed(tracker: &mut ChangeRateTracker, magnitudes: &[f64]) -> Vec<f64> {
        magnitudes
            .iter()
            .map(|&m| tracker.update(m).unwrap())
            .collect()
    }

    fn recomputed_mean(tracker: &ChangeRateTracker) -> f64 {
        let deltas: Vec<f64> = tracker.deltas().collect();
        deltas.mean()
    }

    #[test]
    fn test_zero_window_rejected() {
        assert_eq!(
            ChangeRateTracker::new(0).unwrap_err(),
            BufferError::InvalidCapacity
        );
    }

    #[test]
    fn test_first_sample_produces_no_delta() {
        let mut tracker = ChangeRateTracker::new(10).unwrap();
        let mean = tracker.update(9.81).unwrap();

        assert_eq!(mean, 0.0);
        assert_eq!(tracker.window_len(), 0);
        assert_eq!(tracker.last_magnitude(), Some(9.81));
    }

    #[test]
    fn test_scenario_capacity_three() {
        let mut tracker = ChangeRateTracker::new(3).unwrap();
        let means = feed(&mut tracker, &[1.0, 1.2, 1.5, 1.1]);

        let deltas: Vec<f64> = tracker.deltas().collect();
        assert_eq!(deltas.len(), 3);
        for (got, want) in deltas.iter().zip([0.2, 0.3, 0.4]) {
            assert!((got - want).abs() < TOLERANCE);
        }
        assert!((means[1] - 0.2).abs() < TOLERANCE);
        assert!((means[2] - 0.25).abs() < TOLERANCE);
        assert!((means[3] - 0.3).abs() < TOLERANCE);
        assert!(tracker.is_warmed_up());

        // Window full: 0.2 is evicted for |1.5 - 1.1| = 0.4
        let mean = tracker.update(1.5).unwrap();
        assert!((mean - (0.3 + (0.4 - 0.2) / 3.0)).abs() < TOLERANCE);
        assert!((mean - 0.366_666_7).abs() < 1e-6);
    }

    #[test]
    fn test_full_window_mean_is_exact() {
        let mut tracker = ChangeRateTracker::new(8).unwrap();
        let magnitudes = [1.0, 1.3, 0.9, 1.05, 1.6, 1.2, 1.2, 0.7, 1.1];
        feed(&mut tracker, &magnitudes);

        assert!(tracker.is_warmed_up());
        let expected = recomputed_mean(&tracker);
        assert!((tracker.current_mean() - expected).abs() <= 1e-6 * expected.abs());
    }

    #[test]
    fn test_incremental_matches_recompute_at_steady_state() {
        let mut tracker = ChangeRateTracker::new(16).unwrap();

        // Deterministic pseudo-random walk around 1 g
        let mut magnitude = 1.0;
        for i in 0..5_000u32 {
            let step = ((i.wrapping_mul(2_654_435_761) >> 16) % 200) as f64 / 1000.0 - 0.1;
            magnitude += step;
            tracker.update(magnitude).unwrap();

            if tracker.is_warmed_up() {
                let expected = recomputed_mean(&tracker);
                assert!(
                    (tracker.current_mean() - expected).abs() < 1e-6,
                    "drift at sample {i}: {} vs {expected}",
                    tracker.current_mean()
                );
            }
        }
    }

    #[test]
    fn test_constant_signal_has_zero_mean() {
        let mut tracker = ChangeRateTracker::new(4).unwrap();
        let means = feed(&mut tracker, &[1.0; 20]);
        assert!(means.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_non_finite_input_propagates() {
        let mut tracker = ChangeRateTracker::new(4).unwrap();
        tracker.update(1.0).unwrap();

        let mean = tracker.update(f64::NAN).unwrap();
        assert!(mean.is_nan());

        let mut tracker = ChangeRateTracker::new(4).unwrap();
        tracker.update(1.0).unwrap();
        let mean = tracker.update(f64::INFINITY).unwrap();
        assert!(mean.is_infinite());
    }
}
