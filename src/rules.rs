use std::sync::Arc;

use indexmap::IndexSet;
use tracing::debug;

use crate::dsl::{Expr, Proposition};
use crate::error::{FuzzyError, Result};
use crate::ops::InferenceOps;
use crate::variable::{LinguisticVariable, Role, Variable, VariableKey, Variables};

/// Collects rules before they are checked against a registry.
#[derive(Debug, Default)]
pub struct Rules(pub(crate) Vec<(Expr, Proposition)>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    pub fn add(&mut self, premise: impl Into<Expr>, consequence: Proposition) -> &mut Self {
        self.0.push((premise.into(), consequence));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves every proposition against `vars` and freezes the result.
    ///
    /// Fails on the first proposition naming a missing variable or term, a consequent used in
    /// a premise, or an antecedent used as a target.
    pub fn build(self, vars: Arc<Variables>, ops: InferenceOps) -> Result<RuleBase> {
        let mut antecedents = IndexSet::new();
        let mut consequents = IndexSet::new();
        let mut rules = Vec::with_capacity(self.0.len());

        for (premise, consequence) in self.0 {
            for prop in premise.propositions() {
                resolve(&vars, prop, Role::Antecedent)?;
                antecedents.insert(prop.var);
            }

            let target = resolve(&vars, &consequence, Role::Consequent)?;
            let term = target.term(consequence.term())?.sample(target.universe());

            consequents.insert(consequence.var);
            rules.push(Rule {
                premise,
                consequence,
                term,
                weight: 1.,
            });
        }

        debug!(
            rules = rules.len(),
            antecedents = antecedents.len(),
            consequents = consequents.len(),
            "built rule base"
        );

        Ok(RuleBase {
            vars,
            rules,
            antecedents: antecedents.into_iter().collect(),
            consequents: consequents.into_iter().collect(),
            ops,
        })
    }
}

fn resolve<'v>(vars: &'v Variables, prop: &Proposition, expected: Role) -> Result<&'v LinguisticVariable> {
    let var = vars.get(prop.variable())?;

    if var.role() != expected {
        return Err(FuzzyError::RoleMismatch {
            variable: var.name().to_owned(),
            expected: expected.as_str(),
        });
    }

    var.term(prop.term())?;

    Ok(var)
}

/// `IF premise THEN consequence`, with the consequence term presampled over its universe.
#[derive(Clone, Debug)]
pub struct Rule {
    premise: Expr,
    consequence: Proposition,
    term: Vec<f64>,
    weight: f64,
}

impl Rule {
    pub fn premise(&self) -> &Expr {
        &self.premise
    }

    pub fn consequence(&self) -> &Proposition {
        &self.consequence
    }

    pub(crate) fn term_curve(&self) -> &[f64] {
        &self.term
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A validated, immutable rule base over a shared registry.
///
/// Only reachable through [`Rules::build`], so every reference it holds resolves.
#[derive(Clone, Debug)]
pub struct RuleBase {
    vars: Arc<Variables>,
    rules: Vec<Rule>,
    antecedents: Vec<VariableKey>,
    consequents: Vec<VariableKey>,
    ops: InferenceOps,
}

impl RuleBase {
    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn ops(&self) -> InferenceOps {
        self.ops
    }

    /// Antecedents read by at least one rule, in first-use order.
    pub fn antecedents(&self) -> impl Iterator<Item = Variable> + '_ {
        self.antecedents.iter().map(|key| Variable(*key))
    }

    /// Consequents targeted by at least one rule, in first-use order.
    pub fn consequents(&self) -> impl Iterator<Item = Variable> + '_ {
        self.consequents.iter().map(|key| Variable(*key))
    }
}

#[cfg(test)]
fn fixture() -> (Arc<Variables>, Variable, Variable) {
    use crate::terms::Shape;
    use crate::universe::Universe;

    let mut vars = Variables::new();
    let social = vars
        .add_antecedent("social", Universe::new(0. ..=10., 0.1).unwrap())
        .unwrap();
    let orientation = vars
        .add_consequent("orientation", Universe::new(0. ..=100., 0.5).unwrap())
        .unwrap();

    vars.add_term(social, "high", Shape::Trapezoid([6., 8., 10., 10.])).unwrap();
    vars.add_term(orientation, "extrovert", Shape::Triangle([60., 100., 100.]))
        .unwrap();

    (Arc::new(vars), social, orientation)
}

#[test]
fn test_build_resolves_references() {
    let (vars, social, orientation) = fixture();
    let mut rules = Rules::new();

    rules.add(social.is("high"), orientation.is("extrovert"));

    let base = rules.build(vars, InferenceOps::default()).unwrap();

    assert_eq!(base.rules().len(), 1);
    assert_eq!(base.rules()[0].weight(), 1.);
    assert_eq!(base.rules()[0].term_curve().len(), 201);
    assert_eq!(base.antecedents().collect::<Vec<_>>(), [social]);
    assert_eq!(base.consequents().collect::<Vec<_>>(), [orientation]);
}

#[test]
fn test_build_rejects_unknown_term() {
    let (vars, social, orientation) = fixture();
    let mut rules = Rules::new();

    rules.add(social.is("low"), orientation.is("extrovert"));

    assert_eq!(
        rules.build(vars, InferenceOps::default()).unwrap_err(),
        FuzzyError::UnknownTerm {
            variable: "social".into(),
            term: "low".into()
        }
    );
}

#[test]
fn test_build_rejects_swapped_roles() {
    let (vars, social, orientation) = fixture();
    let mut rules = Rules::new();

    rules.add(orientation.is("extrovert"), social.is("high"));

    assert_eq!(
        rules.build(vars, InferenceOps::default()).unwrap_err(),
        FuzzyError::RoleMismatch {
            variable: "orientation".into(),
            expected: "antecedent"
        }
    );
}

#[test]
fn test_build_rejects_foreign_variable() {
    let (vars, _, orientation) = fixture();
    let mut other = Variables::new();
    let universe = crate::universe::Universe::new(0. ..=1., 0.5).unwrap();
    let foreign = ["a", "b", "c"]
        .into_iter()
        .map(|name| other.add_antecedent(name, universe.clone()).unwrap())
        .last()
        .unwrap();
    let mut rules = Rules::new();

    rules.add(foreign.is("high"), orientation.is("extrovert"));

    assert!(matches!(
        rules.build(vars, InferenceOps::default()),
        Err(FuzzyError::UnknownVariable(_))
    ));
}
