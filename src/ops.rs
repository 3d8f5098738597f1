use serde::{Deserialize, Serialize};

use crate::math::{interp, unit};

/// And operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AndOp {
    #[default]
    Min,
    Prod,
    BoundedProd,
}

impl AndOp {
    pub fn call(self, u: f64, v: f64) -> f64 {
        match self {
            Self::Min => f64::min(u, v),
            Self::Prod => u * v,
            Self::BoundedProd => f64::max(0., u + v - 1.),
        }
    }
}

/// Or operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
}

impl OrOp {
    pub fn call(self, u: f64, v: f64) -> f64 {
        match self {
            Self::Max => f64::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => f64::min(1., u + v),
        }
    }
}

/// How a rule's firing strength shapes its consequent term.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicationOp {
    /// Clip the term at the firing strength (Mamdani)
    #[default]
    Min,
    /// Scale the term by the firing strength (Larsen)
    Prod,
}

impl ImplicationOp {
    pub fn call(self, strength: f64, term: &[f64]) -> Vec<f64> {
        let strength = unit(strength);

        term.iter()
            .map(|&mu| match self {
                Self::Min => f64::min(strength, mu),
                Self::Prod => strength * mu,
            })
            .collect()
    }
}

/// Method for aggregating the consequences of the fuzzy rules.
///
/// Every option is commutative and associative, so the aggregated curve never depends on
/// the order rules are visited in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
}

impl Aggregation {
    pub fn call(self, u: f64, v: f64) -> f64 {
        match self {
            Self::Max => f64::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => f64::min(1., u + v),
        }
    }

    /// Folds `implied` into `acc` point by point.
    pub fn accumulate(self, acc: &mut [f64], implied: &[f64]) {
        debug_assert_eq!(acc.len(), implied.len());

        for (a, mu) in acc.iter_mut().zip(implied) {
            *a = self.call(*a, *mu);
        }
    }
}

/// Method for defuzzifcating the resulting membership function.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defuzzification {
    /// Discrete centroid, `sum(x * mu) / sum(mu)`
    #[default]
    Centroid,
    /// Center of gravity of the piecewise-linear area under the curve
    AreaCentroid,
    /// Bisector of area
    Bisector,
    /// Mean of the values for which the membership function is maximum
    MeanOfMaximum,
    /// Smallest value for which the membership function is maximum
    SmallestOfMaximum,
    /// Largest value for which the membership function is maximum
    LargestOfMaximum,
}

impl Defuzzification {
    /// Reduces `membership` over `universe` to one crisp value.
    ///
    /// Returns `None` when the curve has no mass at all, where every method is undefined.
    pub fn call(self, universe: &[f64], membership: &[f64]) -> Option<f64> {
        debug_assert_eq!(universe.len(), membership.len());

        let total = membership.iter().sum::<f64>();

        if total <= 0. || universe.is_empty() {
            return None;
        }

        let value = match self {
            Self::Centroid => centroid(universe, membership, total),
            // Both fall back to the discrete centroid on a single-point universe
            Self::AreaCentroid => {
                area_centroid(universe, membership).unwrap_or_else(|| centroid(universe, membership, total))
            },
            Self::Bisector => bisector(universe, membership).unwrap_or_else(|| centroid(universe, membership, total)),
            Self::MeanOfMaximum => {
                let maxima = maxima(universe, membership);
                maxima.iter().sum::<f64>() / maxima.len() as f64
            },
            Self::SmallestOfMaximum => maxima(universe, membership).into_iter().reduce(f64::min)?,
            Self::LargestOfMaximum => maxima(universe, membership).into_iter().reduce(f64::max)?,
        };

        Some(value)
    }
}

fn centroid(universe: &[f64], membership: &[f64], total: f64) -> f64 {
    let moment = universe.iter().zip(membership).map(|(x, mu)| x * mu).sum::<f64>();

    moment / total
}

/// Splits each interval into a rectangle and a triangle and weights their centroids by area.
fn area_centroid(universe: &[f64], membership: &[f64]) -> Option<f64> {
    let mut num = 0.;
    let mut den = 0.;

    for i in 0..universe.len().saturating_sub(1) {
        let (x0, x1) = (universe[i], universe[i + 1]);
        let (m0, m1) = (membership[i], membership[i + 1]);
        let base = x1 - x0;
        let area_rect = f64::min(m0, m1) * base;
        let center_rect = x0 + base / 2.;
        let area_tria = base * (m1 - m0).abs() / 2.;
        let center_tria = if m1 > m0 { x0 + 2. / 3. * base } else { x0 + base / 3. };

        num += area_rect * center_rect + area_tria * center_tria;
        den += area_rect + area_tria;
    }

    (den > 0.).then(|| num / den)
}

/// The x splitting the trapezoid-rule area in two equal halves.
fn bisector(universe: &[f64], membership: &[f64]) -> Option<f64> {
    let areas: Vec<f64> = universe
        .windows(2)
        .zip(membership.windows(2))
        .map(|(x, mu)| (mu[0] + mu[1]) * (x[1] - x[0]) / 2.)
        .collect();
    let total = areas.iter().sum::<f64>();

    if total <= 0. {
        return None;
    }

    let target = total / 2.;
    let mut cum = 0.;

    for (i, area) in areas.iter().enumerate() {
        let prev = cum;
        cum += area;

        if cum >= target {
            return Some(interp(target, &[(prev, universe[i]), (cum, universe[i + 1])]));
        }
    }

    universe.last().copied()
}

fn maxima(universe: &[f64], membership: &[f64]) -> Vec<f64> {
    let maximum = membership.iter().copied().fold(0., f64::max);

    universe
        .iter()
        .zip(membership)
        .filter_map(|(x, mu)| (*mu == maximum).then_some(*x))
        .collect()
}

/// The operator set one controller evaluates with; the default is classic Mamdani
/// (min, max, clip, max, centroid).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceOps {
    pub and_op: AndOp,
    pub or_op: OrOp,
    pub implication: ImplicationOp,
    pub aggregation: Aggregation,
    pub defuzzification: Defuzzification,
}

#[cfg(test)]
fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
}

#[test]
fn test_t_norms() {
    assert_eq!(AndOp::Min.call(0.3, 0.8), 0.3);
    assert_close(AndOp::Prod.call(0.5, 0.8), 0.4);
    assert_eq!(AndOp::BoundedProd.call(0.3, 0.5), 0.);
    assert_eq!(OrOp::Max.call(0.3, 0.8), 0.8);
    assert_close(OrOp::ProbOr.call(0.5, 0.5), 0.75);
    assert_eq!(OrOp::BoundedSum.call(0.6, 0.7), 1.);
}

#[test]
fn test_implication() {
    let term = [0., 0.5, 1., 0.5, 0.];

    assert_eq!(ImplicationOp::Min.call(0.6, &term), vec![0., 0.5, 0.6, 0.5, 0.]);
    assert_eq!(ImplicationOp::Prod.call(0.5, &term), vec![0., 0.25, 0.5, 0.25, 0.]);
    assert_eq!(ImplicationOp::Min.call(0., &term), vec![0.; 5]);
}

#[test]
fn test_accumulate_max() {
    let mut acc = vec![0.; 4];

    Aggregation::Max.accumulate(&mut acc, &[0.2, 0.4, 0., 0.]);
    Aggregation::Max.accumulate(&mut acc, &[0., 0.3, 0.9, 0.]);

    assert_eq!(acc, vec![0.2, 0.4, 0.9, 0.]);
}

#[test]
fn test_centroid_of_symmetric_triangle() {
    let universe: Vec<f64> = (0..=20).map(|i| i as f64 * 0.5).collect();
    let membership: Vec<f64> = universe.iter().map(|x| f64::max(0., 1. - (x - 5.).abs() / 2.)).collect();

    for method in [
        Defuzzification::Centroid,
        Defuzzification::AreaCentroid,
        Defuzzification::Bisector,
        Defuzzification::MeanOfMaximum,
    ] {
        assert_close(method.call(&universe, &membership).unwrap(), 5.);
    }
}

#[test]
fn test_maxima_methods() {
    let universe = [0., 1., 2., 3., 4.];
    let plateau = [0., 1., 1., 0.5, 0.];

    assert_eq!(Defuzzification::SmallestOfMaximum.call(&universe, &plateau), Some(1.));
    assert_eq!(Defuzzification::LargestOfMaximum.call(&universe, &plateau), Some(2.));
    assert_eq!(Defuzzification::MeanOfMaximum.call(&universe, &plateau), Some(1.5));
}

#[test]
fn test_empty_curve_is_undefined() {
    let universe = [0., 1., 2.];

    for method in [
        Defuzzification::Centroid,
        Defuzzification::AreaCentroid,
        Defuzzification::Bisector,
        Defuzzification::MeanOfMaximum,
        Defuzzification::SmallestOfMaximum,
        Defuzzification::LargestOfMaximum,
    ] {
        assert_eq!(method.call(&universe, &[0.; 3]), None);
    }
}

#[test]
fn test_ops_json() {
    let ops: InferenceOps = serde_json::from_str(r#"{"implication": "prod", "defuzzification": "bisector"}"#).unwrap();

    assert_eq!(ops.and_op, AndOp::Min);
    assert_eq!(ops.implication, ImplicationOp::Prod);
    assert_eq!(ops.defuzzification, Defuzzification::Bisector);
}
