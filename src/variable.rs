use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};

use crate::error::{FuzzyError, Result};
use crate::outputs::Curve;
use crate::terms::{MembershipFunction, Shape};
use crate::universe::Universe;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// Whether a variable consumes a crisp input or produces a crisp output.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Role {
    Antecedent,
    Consequent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Antecedent => "antecedent",
            Self::Consequent => "consequent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cheap handle onto a registered variable, used to write rules.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Variable(pub(crate) VariableKey);

impl Variable {
    pub fn key(self) -> VariableKey {
        self.0
    }
}

/// A named variable over a universe, owning its terms in insertion order.
#[derive(Clone, Debug)]
pub struct LinguisticVariable {
    name: String,
    role: Role,
    universe: Universe,
    terms: IndexMap<String, MembershipFunction>,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>, role: Role, universe: Universe) -> Self {
        Self {
            name: name.into(),
            role,
            universe,
            terms: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn add_term(&mut self, name: impl Into<String>, shape: Shape) -> Result<&mut Self> {
        let name = name.into();

        if self.terms.contains_key(&name) {
            return Err(FuzzyError::DuplicateTerm {
                variable: self.name.clone(),
                term: name,
            });
        }

        let membership = MembershipFunction::new(shape)?;
        self.terms.insert(name, membership);

        Ok(self)
    }

    pub fn term(&self, term: &str) -> Result<&MembershipFunction> {
        self.terms.get(term).ok_or_else(|| FuzzyError::UnknownTerm {
            variable: self.name.clone(),
            term: term.to_owned(),
        })
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &MembershipFunction)> {
        self.terms.iter().map(|(name, mf)| (name.as_str(), mf))
    }

    pub fn degree_of(&self, term: &str, value: f64) -> Result<f64> {
        Ok(self.term(term)?.degree(value))
    }

    /// The term's membership sampled over this variable's universe, for plotting.
    pub fn term_curve(&self, term: &str) -> Result<Curve> {
        let samples = self.term(term)?.sample(&self.universe);

        Ok(Curve::new(&self.universe, samples))
    }
}

/// The registry of every variable a set of controllers may reference.
///
/// Append-only while configuring; wrap it in an `Arc` once done and share it read-only.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    pub(crate) vars: SlotMap<VariableKey, LinguisticVariable>,
    by_name: HashMap<String, VariableKey>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_antecedent(&mut self, name: impl Into<String>, universe: Universe) -> Result<Variable> {
        self.add(LinguisticVariable::new(name, Role::Antecedent, universe))
    }

    pub fn add_consequent(&mut self, name: impl Into<String>, universe: Universe) -> Result<Variable> {
        self.add(LinguisticVariable::new(name, Role::Consequent, universe))
    }

    fn add(&mut self, var: LinguisticVariable) -> Result<Variable> {
        if self.by_name.contains_key(var.name()) {
            return Err(FuzzyError::DuplicateVariable(var.name.clone()));
        }

        let name = var.name.clone();
        let key = self.vars.insert(var);
        self.by_name.insert(name, key);

        Ok(Variable(key))
    }

    /// Registers `term` on `var`; see [`LinguisticVariable::add_term`].
    pub fn add_term(&mut self, var: Variable, term: impl Into<String>, shape: Shape) -> Result<()> {
        self.get_mut(var)?.add_term(term, shape)?;

        Ok(())
    }

    pub fn variable(&self, name: &str) -> Result<Variable> {
        self.by_name
            .get(name)
            .map(|key| Variable(*key))
            .ok_or_else(|| FuzzyError::UnknownVariable(name.to_owned()))
    }

    pub fn get(&self, var: Variable) -> Result<&LinguisticVariable> {
        self.vars
            .get(var.0)
            .ok_or_else(|| FuzzyError::UnknownVariable(format!("{:?}", var.0)))
    }

    fn get_mut(&mut self, var: Variable) -> Result<&mut LinguisticVariable> {
        self.vars
            .get_mut(var.0)
            .ok_or_else(|| FuzzyError::UnknownVariable(format!("{:?}", var.0)))
    }

    pub fn by_name(&self, name: &str) -> Result<&LinguisticVariable> {
        self.get(self.variable(name)?)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
fn ten() -> Universe {
    Universe::new(0. ..=10., 0.1).unwrap()
}

#[test]
fn test_duplicate_term() {
    let mut social = LinguisticVariable::new("social", Role::Antecedent, ten());

    social.add_term("low", Shape::Trapezoid([0., 0., 3., 5.])).unwrap();

    let err = social.add_term("low", Shape::Triangle([4., 5.5, 7.])).unwrap_err();

    assert_eq!(
        err,
        FuzzyError::DuplicateTerm {
            variable: "social".into(),
            term: "low".into()
        }
    );
}

#[test]
fn test_invalid_shape_is_not_registered() {
    let mut social = LinguisticVariable::new("social", Role::Antecedent, ten());

    assert!(social.add_term("med", Shape::Triangle([7., 5.5, 4.])).is_err());
    assert!(social.term("med").is_err());
}

#[test]
fn test_degree_of() {
    let mut talk = LinguisticVariable::new("talk", Role::Antecedent, ten());

    talk.add_term("low", Shape::Trapezoid([0., 0., 3., 5.]))
        .unwrap()
        .add_term("high", Shape::Trapezoid([6., 8., 10., 10.]))
        .unwrap();

    assert_eq!(talk.degree_of("low", 4.), Ok(0.5));
    assert_eq!(talk.degree_of("high", 9.), Ok(1.));
    assert_eq!(
        talk.degree_of("loud", 9.),
        Err(FuzzyError::UnknownTerm {
            variable: "talk".into(),
            term: "loud".into()
        })
    );
    assert_eq!(talk.terms().map(|(name, _)| name).collect::<Vec<_>>(), ["low", "high"]);
}

#[test]
fn test_registry() {
    let mut vars = Variables::new();
    let social = vars.add_antecedent("social", ten()).unwrap();

    vars.add_term(social, "low", Shape::Trapezoid([0., 0., 3., 5.])).unwrap();

    assert_eq!(vars.variable("social"), Ok(social));
    assert_eq!(vars.get(social).unwrap().role(), Role::Antecedent);
    assert_eq!(
        vars.add_consequent("social", ten()).unwrap_err(),
        FuzzyError::DuplicateVariable("social".into())
    );
    assert_eq!(vars.variable("mood"), Err(FuzzyError::UnknownVariable("mood".into())));
    assert_eq!(vars.len(), 1);
}

#[test]
fn test_term_curve() {
    let mut vars = Variables::new();
    let orientation = vars
        .add_consequent("orientation", Universe::new(0. ..=100., 0.5).unwrap())
        .unwrap();

    vars.add_term(orientation, "ambivert", Shape::Triangle([30., 50., 70.]))
        .unwrap();

    let curve = vars.by_name("orientation").unwrap().term_curve("ambivert").unwrap();

    assert_eq!(curve.len(), 201);
    assert_eq!(curve.points()[100], (50., 1.));
}
