//! Per-sample motion reports.
//!
//! [`MotionMonitor`] is the single entry point of the core: it reduces a
//! sample to its magnitude, feeds the change-rate tracker and classifies the
//! resulting mean.

use crate::collector::types::AccelSample;
use crate::core::change_rate::ChangeRateTracker;
use crate::core::classifier::{MotionClassifier, MotionState};
use crate::core::ring_buffer::BufferError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Euclidean norm of a 3-axis vector.
pub fn magnitude(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

/// Everything the sinks need to know about one processed sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionReport {
    /// Sequence number of the sample within this monitor
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub magnitude: f64,
    /// Running mean of the change rate after this sample
    pub mean_change_rate: f64,
    pub state: MotionState,
    /// Whether the state differs from the previous sample's state
    pub state_changed: bool,
}

/// Couples a [`ChangeRateTracker`] with a [`MotionClassifier`].
#[derive(Debug, Clone)]
pub struct MotionMonitor {
    tracker: ChangeRateTracker,
    classifier: MotionClassifier,
    last_state: Option<MotionState>,
    processed: u64,
}

impl MotionMonitor {
    /// Create a monitor with the given window capacity and RUN threshold.
    pub fn new(window_capacity: usize, threshold: f64) -> Result<Self, BufferError> {
        Ok(Self {
            tracker: ChangeRateTracker::new(window_capacity)?,
            classifier: MotionClassifier::new(threshold),
            last_state: None,
            processed: 0,
        })
    }

    /// Process one sample and produce its report.
    pub fn process(&mut self, sample: &AccelSample) -> Result<MotionReport, BufferError> {
        let magnitude = sample.magnitude();
        let mean_change_rate = self.tracker.update(magnitude)?;
        let state = self.classifier.classify(mean_change_rate);

        // The first sample has nothing to change from
        let state_changed = self.last_state.is_some_and(|prev| prev != state);
        self.last_state = Some(state);

        let report = MotionReport {
            sequence: self.processed,
            timestamp: sample.timestamp,
            x: sample.x,
            y: sample.y,
            z: sample.z,
            magnitude,
            mean_change_rate,
            state,
            state_changed,
        };
        self.processed += 1;

        Ok(report)
    }

    /// Current state, or `None` before the first sample.
    pub fn state(&self) -> Option<MotionState> {
        self.last_state
    }

    pub fn mean_change_rate(&self) -> f64 {
        self.tracker.current_mean()
    }

    pub fn tracker(&self) -> &ChangeRateTracker {
        &self.tracker
    }

    pub fn classifier(&self) -> &MotionClassifier {
        &self.classifier
    }

    /// Number of samples processed so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, z: f64) -> AccelSample {
        AccelSample::new(x, y, z)
    }

    #[test]
    fn test_magnitude() {
        assert!((magnitude(3.0, 4.0, 0.0) - 5.0).abs() < 1e-12);
        assert_eq!(magnitude(0.0, 0.0, 0.0), 0.0);
        assert!((magnitude(-1.0, -2.0, 2.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_report_is_stop_without_change() {
        let mut monitor = MotionMonitor::new(10, 0.07).unwrap();
        let report = monitor.process(&sample(0.0, 0.0, 1.0)).unwrap();

        assert_eq!(report.sequence, 0);
        assert_eq!(report.mean_change_rate, 0.0);
        assert_eq!(report.state, MotionState::Stop);
        assert!(!report.state_changed);
    }

    #[test]
    fn test_shaking_switches_to_run_and_back() {
        let mut monitor = MotionMonitor::new(4, 0.07).unwrap();

        // At rest
        for _ in 0..5 {
            let report = monitor.process(&sample(0.0, 0.0, 1.0)).unwrap();
            assert_eq!(report.state, MotionState::Stop);
        }

        // Shake: magnitude alternates between 1.0 and 1.5
        let mut transitions = 0;
        for i in 0..6 {
            let z = if i % 2 == 0 { 1.5 } else { 1.0 };
            let report = monitor.process(&sample(0.0, 0.0, z)).unwrap();
            if report.state_changed {
                transitions += 1;
            }
        }
        assert_eq!(monitor.state(), Some(MotionState::Run));
        assert_eq!(transitions, 1);

        // Rest again until the window drains
        for _ in 0..8 {
            monitor.process(&sample(0.0, 0.0, 1.0)).unwrap();
        }
        assert_eq!(monitor.state(), Some(MotionState::Stop));
        assert!(monitor.mean_change_rate().abs() < 1e-9);
        assert_eq!(monitor.processed(), 19);
    }
}
