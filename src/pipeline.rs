// src/pipeline.rs
//
// Observation pipeline for continuous-state control.
//
// Wires the derivative smoother in front of the discretizer: raw
// (position, derivative, auxiliary) readings come in, the derivative
// channel is run through the fixed-window running average, and the result
// is folded into a flat state index. Reset on episode restart so stale
// derivative readings never leak across a discontinuity.

use crate::discretizer::Discretizer;
use crate::error::Result;
use crate::smoother::RunningAverage;

/// One encoded observation with its intermediate signals, kept for
/// telemetry and reward computation.
#[derive(Debug, Clone, Copy)]
pub struct EncodedObservation {
    pub state: usize,
    pub position: f64,
    pub derivative_raw: f64,
    pub derivative_smoothed: f64,
    pub auxiliary: f64,
}

#[derive(Debug, Clone)]
pub struct StatePipeline {
    discretizer: Discretizer,
    smoother: RunningAverage,
    prev_position: f64,
}

impl StatePipeline {
    pub fn new(discretizer: Discretizer, smoothing_window: usize) -> Self {
        Self {
            discretizer,
            smoother: RunningAverage::new(smoothing_window),
            prev_position: 0.0,
        }
    }

    pub fn discretizer(&self) -> &Discretizer {
        &self.discretizer
    }

    /// Position reading from the previous step (0 after a reset).
    pub fn prev_position(&self) -> f64 {
        self.prev_position
    }

    /// Finite-difference derivative of the position over `dt`.
    pub fn position_derivative(&self, position: f64, dt: f64) -> f64 {
        (position - self.prev_position) / dt
    }

    /// Smooth the derivative channel and encode the observation.
    ///
    /// Degenerate (NaN/infinite) readings are rejected before they can
    /// alias into the overflow bucket.
    pub fn encode(
        &mut self,
        position: f64,
        derivative: f64,
        auxiliary: f64,
    ) -> Result<EncodedObservation> {
        let derivative_smoothed = self.smoother.push(derivative);
        let state = self
            .discretizer
            .encode(&[position, derivative_smoothed, auxiliary])?;
        self.prev_position = position;
        Ok(EncodedObservation {
            state,
            position,
            derivative_raw: derivative,
            derivative_smoothed,
            auxiliary,
        })
    }

    /// Clear the smoothing buffer and previous-value tracking on episode
    /// restart.
    pub fn reset(&mut self) {
        self.smoother.clear();
        self.prev_position = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretizer::Dimension;

    fn pipeline() -> StatePipeline {
        let disc = Discretizer::new(vec![
            Dimension::new("pos", vec![-1.0, 0.0, 1.0]).unwrap(),
            Dimension::new("deriv", vec![-1.0, 0.0, 1.0]).unwrap(),
            Dimension::new("aux", vec![0.0]).unwrap(),
        ])
        .unwrap();
        StatePipeline::new(disc, 3)
    }

    #[test]
    fn encode_smooths_the_derivative_channel() {
        let mut p = pipeline();
        // Raw derivatives 3.0 then -3.0: the smoothed value after two
        // pushes is 0.0, which buckets differently than either raw value.
        let first = p.encode(0.0, 3.0, -1.0).unwrap();
        assert_eq!(first.derivative_smoothed, 3.0);
        let second = p.encode(0.0, -3.0, -1.0).unwrap();
        assert_eq!(second.derivative_smoothed, 0.0);
        assert!(second.state < p.discretizer().state_count());
    }

    #[test]
    fn reset_clears_smoothing_and_prev_tracking() {
        let mut p = pipeline();
        p.encode(2.0, 5.0, 0.0).unwrap();
        assert_eq!(p.prev_position(), 2.0);
        p.reset();
        assert_eq!(p.prev_position(), 0.0);
        // Fresh fill phase: a single push is its own mean.
        let obs = p.encode(0.0, -4.0, 0.0).unwrap();
        assert_eq!(obs.derivative_smoothed, -4.0);
    }

    #[test]
    fn degenerate_reading_is_rejected() {
        let mut p = pipeline();
        assert!(p.encode(f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn derivative_from_finite_difference() {
        let mut p = pipeline();
        p.encode(1.0, 0.0, 0.0).unwrap();
        let d = p.position_derivative(2.0, 0.5);
        assert_eq!(d, 2.0);
    }
}
