use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};
use crate::universe::Universe;

/// A membership curve as `(x, degree)` pairs over a full universe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve(Vec<(f64, f64)>);

impl Curve {
    pub(crate) fn new(universe: &Universe, degrees: Vec<f64>) -> Self {
        debug_assert_eq!(universe.len(), degrees.len());

        Self(universe.iter().copied().zip(degrees).collect())
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.0
    }

    pub fn degrees(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|(_, mu)| *mu)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a compute produced for one consequent.
#[derive(Clone, Debug, PartialEq)]
pub struct Inferred {
    pub crisp: f64,
    pub aggregated: Curve,
}

/// The result of one session compute: a crisp value and aggregated curve per consequent,
/// plus every rule's firing strength in rule base order.
#[derive(Clone, Debug, PartialEq)]
pub struct Outputs {
    inferred: IndexMap<String, Inferred>,
    firing_strengths: Vec<f64>,
}

impl Outputs {
    pub(crate) fn new(inferred: IndexMap<String, Inferred>, firing_strengths: Vec<f64>) -> Self {
        Self {
            inferred,
            firing_strengths,
        }
    }

    pub fn crisp(&self, consequent: &str) -> Result<f64> {
        self.lookup(consequent, "crisp").map(|inferred| inferred.crisp)
    }

    pub fn aggregated(&self, consequent: &str) -> Result<&Curve> {
        self.lookup(consequent, "aggregated").map(|inferred| &inferred.aggregated)
    }

    /// Fails with `UnknownTerm` naming the consequent and the `output` that was asked for.
    pub fn get(&self, consequent: &str) -> Result<&Inferred> {
        self.lookup(consequent, "output")
    }

    fn lookup(&self, consequent: &str, output: &str) -> Result<&Inferred> {
        self.inferred.get(consequent).ok_or_else(|| FuzzyError::UnknownTerm {
            variable: consequent.to_owned(),
            term: output.to_owned(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Inferred)> {
        self.inferred.iter().map(|(name, inferred)| (name.as_str(), inferred))
    }

    pub fn firing_strengths(&self) -> &[f64] {
        &self.firing_strengths
    }
}

#[test]
fn test_outputs_lookup() {
    let universe = Universe::new(0. ..=1., 0.5).unwrap();
    let mut inferred = IndexMap::new();

    inferred.insert(
        "orientation".to_owned(),
        Inferred {
            crisp: 0.75,
            aggregated: Curve::new(&universe, vec![0., 0.5, 1.]),
        },
    );

    let outputs = Outputs::new(inferred, vec![0.5, 1.]);

    assert_eq!(outputs.crisp("orientation"), Ok(0.75));
    assert_eq!(
        outputs.crisp("stability"),
        Err(FuzzyError::UnknownTerm {
            variable: "stability".into(),
            term: "crisp".into()
        })
    );
    assert_eq!(
        outputs.aggregated("mood").unwrap_err(),
        FuzzyError::UnknownTerm {
            variable: "mood".into(),
            term: "aggregated".into()
        }
    );
    assert_eq!(
        outputs.aggregated("orientation").unwrap().points(),
        &[(0., 0.), (0.5, 0.5), (1., 1.)]
    );
    assert_eq!(outputs.firing_strengths(), &[0.5, 1.]);
}

#[test]
fn test_curve_json() {
    let universe = Universe::new(0. ..=1., 1.).unwrap();
    let curve = Curve::new(&universe, vec![1., 0.25]);

    assert_eq!(serde_json::to_string(&curve).unwrap(), "[[0.0,1.0],[1.0,0.25]]");
}
