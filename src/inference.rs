use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::error::{FuzzyError, Result};
use crate::inputs::Inputs;
use crate::outputs::{Curve, Inferred, Outputs};
use crate::rules::RuleBase;
use crate::variable::{Role, Variable};

/// Where a session is in its single-shot lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Attached to a rule base, nothing bound
    Building,
    /// Some but not all antecedents the rule base reads are bound
    InputsPartial,
    /// Every antecedent the rule base reads is bound
    Ready,
    /// Outputs have been produced; reset before binding new inputs
    Computed,
}

/// One evaluation of one rule base over one input vector.
#[derive(Debug)]
pub struct InferenceSession<'r> {
    rule_base: &'r RuleBase,
    inputs: Inputs,
    state: SessionState,
    outputs: Option<Outputs>,
}

impl<'r> InferenceSession<'r> {
    pub fn new(rule_base: &'r RuleBase) -> Self {
        Self {
            rule_base,
            inputs: Inputs::new(),
            state: SessionState::Building,
            outputs: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn rule_base(&self) -> &'r RuleBase {
        self.rule_base
    }

    /// Binds a crisp value to an antecedent by name.
    pub fn set_input(&mut self, name: &str, value: f64) -> Result<&mut Self> {
        let var = self.rule_base.variables().variable(name)?;

        self.set(var, value)
    }

    /// Binds a crisp value to an antecedent. Values outside the universe are accepted and
    /// simply fall outside every term's support.
    pub fn set(&mut self, var: Variable, value: f64) -> Result<&mut Self> {
        if self.state == SessionState::Computed {
            return Err(FuzzyError::SessionNotReady(self.state));
        }

        let variable = self.rule_base.variables().get(var)?;

        if variable.role() != Role::Antecedent {
            return Err(FuzzyError::RoleMismatch {
                variable: variable.name().to_owned(),
                expected: Role::Antecedent.as_str(),
            });
        }

        self.inputs.add(var, value);

        // Antecedents no rule reads are stored but never move the session forward
        if self.rule_base.antecedents().any(|read| read == var) {
            self.state = if self.missing().next().is_none() {
                SessionState::Ready
            } else {
                SessionState::InputsPartial
            };
        }

        Ok(self)
    }

    /// Antecedents the rule base reads that are still unbound.
    pub fn missing(&self) -> impl Iterator<Item = Variable> + '_ {
        self.rule_base.antecedents().filter(|var| !self.inputs.contains(*var))
    }

    /// Runs fuzzification, rule evaluation, implication, aggregation and defuzzification.
    ///
    /// Only valid from `Ready`. A partially bound session reports its first missing
    /// antecedent; an empty or already computed one reports `SessionNotReady`.
    pub fn compute(&mut self) -> Result<&Outputs> {
        match self.state {
            SessionState::Ready => {},
            SessionState::InputsPartial => {
                let name = match self.missing().next() {
                    Some(var) => self.rule_base.variables().get(var)?.name().to_owned(),
                    None => return Err(FuzzyError::SessionNotReady(self.state)),
                };

                return Err(FuzzyError::MissingInput(name));
            },
            SessionState::Building | SessionState::Computed => {
                return Err(FuzzyError::SessionNotReady(self.state));
            },
        }

        let outputs = evaluate(self.rule_base, &self.inputs)?;

        self.state = SessionState::Computed;

        Ok(&*self.outputs.insert(outputs))
    }

    /// The outputs of the last successful compute.
    pub fn outputs(&self) -> Option<&Outputs> {
        self.outputs.as_ref()
    }

    /// Drops every binding and output, returning to `Building`.
    pub fn reset(&mut self) {
        self.inputs.clear();
        self.outputs = None;
        self.state = SessionState::Building;
    }
}

/// Evaluates `rule_base` against `inputs` from scratch.
pub(crate) fn evaluate(rule_base: &RuleBase, inputs: &Inputs) -> Result<Outputs> {
    let vars = rule_base.variables();
    let ops = rule_base.ops();
    let mut aggregated = IndexMap::with_capacity(rule_base.consequents().count());

    // Every consequent starts from the all-zero curve so untargeted terms contribute nothing
    for var in rule_base.consequents() {
        aggregated.insert(var.key(), vars.get(var)?.universe().zeros());
    }

    let mut firing_strengths = Vec::with_capacity(rule_base.rules().len());

    for (i, rule) in rule_base.rules().iter().enumerate() {
        let strength = rule.premise().eval(vars, inputs, ops.and_op, ops.or_op)? * rule.weight();
        let implied = ops.implication.call(strength, rule.term_curve());
        let target = rule.consequence().variable().key();

        trace!(rule = i, strength, "fired");

        if let Some(acc) = aggregated.get_mut(&target) {
            ops.aggregation.accumulate(acc, &implied);
        }

        firing_strengths.push(strength);
    }

    let mut inferred = IndexMap::with_capacity(aggregated.len());

    for (key, curve) in aggregated {
        let var = vars.get(Variable(key))?;
        let Some(crisp) = ops.defuzzification.call(var.universe(), &curve) else {
            warn!(consequent = var.name(), "no rule fired");
            return Err(FuzzyError::NoActiveRule(var.name().to_owned()));
        };

        debug!(consequent = var.name(), crisp, "defuzzified");

        inferred.insert(
            var.name().to_owned(),
            Inferred {
                crisp,
                aggregated: Curve::new(var.universe(), curve),
            },
        );
    }

    Ok(Outputs::new(inferred, firing_strengths))
}

#[cfg(test)]
mod fixture {
    use std::sync::Arc;

    use crate::ops::InferenceOps;
    use crate::rules::{RuleBase, Rules};
    use crate::terms::Shape;
    use crate::universe::Universe;
    use crate::variable::Variables;

    pub(super) fn rule_base() -> RuleBase {
        let mut vars = Variables::new();
        let ten = Universe::new(0. ..=10., 0.1).unwrap();
        let energy = vars.add_antecedent("energy", ten.clone()).unwrap();
        let express = vars.add_antecedent("express", ten.clone()).unwrap();
        let unused = vars.add_antecedent("unused", ten).unwrap();
        let stability = vars
            .add_consequent("stability", Universe::new(0. ..=100., 0.5).unwrap())
            .unwrap();

        for var in [energy, express, unused] {
            vars.add_term(var, "low", Shape::Trapezoid([0., 0., 3., 5.])).unwrap();
            vars.add_term(var, "med", Shape::Triangle([4., 5.5, 7.])).unwrap();
            vars.add_term(var, "high", Shape::Trapezoid([6., 8., 10., 10.])).unwrap();
        }

        vars.add_term(stability, "low", Shape::Triangle([0., 0., 50.])).unwrap();
        vars.add_term(stability, "balanced", Shape::Triangle([30., 50., 70.]))
            .unwrap();
        vars.add_term(stability, "high", Shape::Triangle([60., 100., 100.]))
            .unwrap();

        let mut rules = Rules::new();

        rules
            .add(energy.is("med").and(express.is("med")), stability.is("balanced"))
            .add(energy.is("high").or(express.is("high")), stability.is("high"));

        rules.build(Arc::new(vars), InferenceOps::default()).unwrap()
    }
}

#[cfg(test)]
fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!((actual - expected).abs() < tolerance, "{actual} != {expected}");
}

#[test]
fn test_state_machine() {
    let base = fixture::rule_base();
    let mut session = InferenceSession::new(&base);

    assert_eq!(session.state(), SessionState::Building);
    assert_eq!(session.compute().unwrap_err(), FuzzyError::SessionNotReady(SessionState::Building));

    session.set_input("energy", 5.5).unwrap();
    assert_eq!(session.state(), SessionState::InputsPartial);
    assert_eq!(session.compute().unwrap_err(), FuzzyError::MissingInput("express".into()));

    session.set_input("express", 5.5).unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    session.compute().unwrap();
    assert_eq!(session.state(), SessionState::Computed);
    assert_eq!(session.compute().unwrap_err(), FuzzyError::SessionNotReady(SessionState::Computed));
    assert_eq!(
        session.set_input("energy", 1.).unwrap_err(),
        FuzzyError::SessionNotReady(SessionState::Computed)
    );

    session.reset();
    assert_eq!(session.state(), SessionState::Building);
    assert!(session.outputs().is_none());
}

#[test]
fn test_unused_antecedent_is_not_required() {
    let base = fixture::rule_base();
    let mut session = InferenceSession::new(&base);

    session.set_input("energy", 5.5).unwrap().set_input("express", 5.5).unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(base.antecedents().count(), 2);
}

#[test]
fn test_unread_antecedent_keeps_the_state() {
    let base = fixture::rule_base();
    let mut session = InferenceSession::new(&base);

    session.set_input("unused", 5.).unwrap();
    assert_eq!(session.state(), SessionState::Building);
    assert_eq!(session.compute().unwrap_err(), FuzzyError::SessionNotReady(SessionState::Building));

    session.set_input("energy", 5.5).unwrap().set_input("unused", 1.).unwrap();
    assert_eq!(session.state(), SessionState::InputsPartial);

    session.set_input("express", 5.5).unwrap().set_input("unused", 2.).unwrap();
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn test_rejects_unknown_and_consequent_inputs() {
    let base = fixture::rule_base();
    let mut session = InferenceSession::new(&base);

    assert_eq!(
        session.set_input("mood", 1.).unwrap_err(),
        FuzzyError::UnknownVariable("mood".into())
    );
    assert_eq!(
        session.set_input("stability", 1.).unwrap_err(),
        FuzzyError::RoleMismatch {
            variable: "stability".into(),
            expected: "antecedent"
        }
    );
    assert_eq!(session.state(), SessionState::Building);
}

#[test]
fn test_single_symmetric_term_defuzzifies_to_its_peak() {
    let base = fixture::rule_base();
    let mut session = InferenceSession::new(&base);

    // med peaks at 5.5 and high is 0 there, so only the balanced triangle fires
    session.set_input("energy", 5.5).unwrap().set_input("express", 5.5).unwrap();

    let outputs = session.compute().unwrap();

    assert_eq!(outputs.firing_strengths(), &[1., 0.]);
    assert_close(outputs.crisp("stability").unwrap(), 50., 1e-9);
}

#[test]
fn test_partial_strength_clips_the_curve() {
    let base = fixture::rule_base();
    let mut session = InferenceSession::new(&base);

    session.set_input("energy", 7.).unwrap().set_input("express", 0.).unwrap();

    let outputs = session.compute().unwrap();
    let peak = outputs
        .aggregated("stability")
        .unwrap()
        .degrees()
        .fold(0., f64::max);

    assert_eq!(outputs.firing_strengths(), &[0., 0.5]);
    assert_eq!(peak, 0.5);
    assert!(outputs.crisp("stability").unwrap() > 60.);
}

#[test]
fn test_no_active_rule() {
    let base = fixture::rule_base();
    let mut session = InferenceSession::new(&base);

    // energy 2 is only low, express 2 is only low; neither rule reads low
    session.set_input("energy", 2.).unwrap().set_input("express", 2.).unwrap();

    assert_eq!(session.compute().unwrap_err(), FuzzyError::NoActiveRule("stability".into()));
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn test_out_of_range_inputs_fall_outside_support() {
    let base = fixture::rule_base();
    let mut session = InferenceSession::new(&base);

    session.set_input("energy", 42.).unwrap().set_input("express", -3.).unwrap();

    assert_eq!(session.compute().unwrap_err(), FuzzyError::NoActiveRule("stability".into()));
}

#[test]
fn test_repeated_evaluations_are_identical() {
    let base = fixture::rule_base();
    let run = || {
        let mut session = InferenceSession::new(&base);

        session.set_input("energy", 6.3).unwrap().set_input("express", 5.1).unwrap();

        let outputs = session.compute().unwrap().clone();
        outputs
    };

    assert_eq!(run(), run());
}
