use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};
use crate::math::{interp, unit};
use crate::universe::Universe;

/// Control points of a piecewise-linear fuzzy set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "points", rename_all = "lowercase")]
pub enum Shape {
    /// `a <= b <= c`, peak of 1.0 at `b`
    Triangle([f64; 3]),
    /// `a <= b <= c <= d`, plateau of 1.0 over `[b, c]`
    Trapezoid([f64; 4]),
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Triangle(_) => "triangle",
            Self::Trapezoid(_) => "trapezoid",
        }
    }

    pub fn points(&self) -> &[f64] {
        match self {
            Self::Triangle(p) => p.as_slice(),
            Self::Trapezoid(p) => p.as_slice(),
        }
    }

    fn validate(&self) -> Result<()> {
        let points = self.points();
        let finite = points.iter().all(|p| p.is_finite());
        let ordered = points.windows(2).all(|w| w[0] <= w[1]);

        if finite && ordered {
            Ok(())
        } else {
            Err(FuzzyError::InvalidShape {
                shape: self.name(),
                points: points.to_vec(),
            })
        }
    }

    /// The (x, degree) corners the shape interpolates through.
    fn corners(&self) -> Vec<(f64, f64)> {
        match *self {
            Self::Triangle([a, b, c]) => vec![(a, 0.), (b, 1.), (c, 0.)],
            Self::Trapezoid([a, b, c, d]) => vec![(a, 0.), (b, 1.), (c, 1.), (d, 0.)],
        }
    }
}

/// A validated shape plus its evaluator.
#[derive(Clone, Debug, PartialEq)]
pub struct MembershipFunction {
    shape: Shape,
    corners: Vec<(f64, f64)>,
}

impl MembershipFunction {
    pub fn new(shape: Shape) -> Result<Self> {
        shape.validate()?;

        Ok(Self {
            corners: shape.corners(),
            shape,
        })
    }

    pub fn triangle(a: f64, b: f64, c: f64) -> Result<Self> {
        Self::new(Shape::Triangle([a, b, c]))
    }

    pub fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        Self::new(Shape::Trapezoid([a, b, c, d]))
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Degree of membership of `x`, total over every real and always within [0, 1].
    ///
    /// Anything outside `[a, d]` (or `[a, c]` for triangles) is 0, corners are hit exactly.
    pub fn degree(&self, x: f64) -> f64 {
        let (lo, hi) = match (self.corners.first(), self.corners.last()) {
            (Some(&(lo, _)), Some(&(hi, _))) => (lo, hi),
            _ => return 0.,
        };

        if !(lo..=hi).contains(&x) {
            return 0.;
        }

        unit(interp(x, &self.corners))
    }

    /// Degrees at every point of `universe`.
    pub fn sample(&self, universe: &Universe) -> Vec<f64> {
        universe.iter().map(|&x| self.degree(x)).collect()
    }
}

#[test]
fn test_trapezoid_corners() {
    let low = MembershipFunction::trapezoid(0., 0., 3., 5.).unwrap();

    assert_eq!(low.degree(0.), 1.);
    assert_eq!(low.degree(3.), 1.);
    assert_eq!(low.degree(4.), 0.5);
    assert_eq!(low.degree(5.), 0.);
    assert_eq!(low.degree(-0.5), 0.);
    assert_eq!(low.degree(12.), 0.);
}

#[test]
fn test_triangle_corners() {
    let med = MembershipFunction::triangle(4., 5.5, 7.).unwrap();

    assert_eq!(med.degree(5.5), 1.);
    assert_eq!(med.degree(4.), 0.);
    assert_eq!(med.degree(7.), 0.);
    assert!((med.degree(4.75) - 0.5).abs() < 1e-12);
}

#[test]
fn test_right_shoulder() {
    let high = MembershipFunction::trapezoid(6., 8., 10., 10.).unwrap();

    assert_eq!(high.degree(10.), 1.);
    assert_eq!(high.degree(7.), 0.5);
    assert_eq!(high.degree(10.5), 0.);
}

#[test]
fn test_invalid_shapes() {
    let err = MembershipFunction::triangle(5., 4., 7.).unwrap_err();

    assert_eq!(
        err,
        FuzzyError::InvalidShape {
            shape: "triangle",
            points: vec![5., 4., 7.]
        }
    );
    assert!(MembershipFunction::trapezoid(0., 1., f64::NAN, 3.).is_err());
    assert!(MembershipFunction::trapezoid(0., 3., 2., 4.).is_err());
}

#[test]
fn test_sample_over_universe() {
    let universe = Universe::new(0. ..=100., 0.5).unwrap();
    let introvert = MembershipFunction::triangle(0., 0., 50.).unwrap();
    let curve = introvert.sample(&universe);

    assert_eq!(curve.len(), universe.len());
    assert_eq!(curve[0], 1.);
    assert_eq!(curve[50], 0.5);
    assert_eq!(curve[100], 0.);
}

#[test]
fn test_shape_json() {
    let json = serde_json::to_string(&Shape::Triangle([30., 50., 70.])).unwrap();

    assert_eq!(json, r#"{"shape":"triangle","points":[30.0,50.0,70.0]}"#);
}
