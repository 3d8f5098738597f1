use std::ops::{Deref, RangeInclusive};

use crate::error::{FuzzyError, Result};
use crate::linspace::Linspace;

/// Slack absorbed when dividing the span by the step, so `(10 - 0) / 0.1` counts 101 samples.
const STEP_EPSILON: f64 = 1e-9;

/// Upper bound on `(max - min) / step`, keeping the sample count allocatable.
const MAX_INTERVALS: usize = 1 << 28;

/// A discretized, strictly increasing domain `min, min + step, ..., <= max`.
///
/// Immutable once built; curves sampled over it have exactly `len()` entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    points: Vec<f64>,
    min: f64,
    max: f64,
    step: f64,
}

impl Universe {
    pub fn new(range: RangeInclusive<f64>, step: f64) -> Result<Self> {
        let (min, max) = range.into_inner();
        let valid = min.is_finite() && max.is_finite() && step.is_finite() && max > min && step > 0.;

        if !valid {
            return Err(FuzzyError::InvalidUniverse { min, max, step });
        }

        let intervals = ((max - min) / step + STEP_EPSILON).floor();

        if !intervals.is_finite() || intervals >= MAX_INTERVALS as f64 {
            return Err(FuzzyError::InvalidUniverse { min, max, step });
        }

        let intervals = intervals as usize;
        let last = min + step * intervals as f64;
        let points = Linspace::new(min, last, intervals + 1).collect();

        Ok(Self { points, min, max, step })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// An all-zero curve over this universe.
    pub(crate) fn zeros(&self) -> Vec<f64> {
        vec![0.; self.points.len()]
    }
}

impl Deref for Universe {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.points
    }
}

#[test]
fn test_universe_sizes() {
    let inputs = Universe::new(0. ..=10., 0.1).unwrap();
    let outputs = Universe::new(0. ..=100., 0.5).unwrap();

    assert_eq!(inputs.len(), 101);
    assert_eq!(outputs.len(), 201);
    assert_eq!(outputs[1], 0.5);
    assert_eq!(*outputs.last().unwrap(), 100.);
    assert!(inputs.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_universe_stops_before_overshooting() {
    let universe = Universe::new(0. ..=1., 0.3).unwrap();

    assert_eq!(universe.len(), 4);
    assert!(*universe.last().unwrap() <= 1.);
}

#[test]
fn test_invalid_universe() {
    assert!(matches!(Universe::new(5. ..=5., 0.1), Err(FuzzyError::InvalidUniverse { .. })));
    assert!(matches!(Universe::new(0. ..=1., 0.), Err(FuzzyError::InvalidUniverse { .. })));
    assert!(matches!(Universe::new(0. ..=f64::INFINITY, 1.), Err(FuzzyError::InvalidUniverse { .. })));
}

#[test]
fn test_oversized_universe() {
    assert_eq!(
        Universe::new(0. ..=1e300, 1e-10),
        Err(FuzzyError::InvalidUniverse {
            min: 0.,
            max: 1e300,
            step: 1e-10
        })
    );
    assert!(matches!(Universe::new(0. ..=1e9, 1.), Err(FuzzyError::InvalidUniverse { .. })));
    assert_eq!(Universe::new(0. ..=1e6, 1.).unwrap().len(), 1_000_001);
}
