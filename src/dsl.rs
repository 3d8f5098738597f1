use crate::error::{FuzzyError, Result};
use crate::inputs::Inputs;
use crate::ops::{AndOp, OrOp};
use crate::variable::{Variable, VariableKey, Variables};

/// `variable is term`, the leaf of every rule expression and the target of every rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Proposition {
    pub(crate) var: VariableKey,
    pub(crate) term: String,
}

impl Proposition {
    pub fn variable(&self) -> Variable {
        Variable(self.var)
    }

    pub fn term(&self) -> &str {
        &self.term
    }
}

/// A rule premise: propositions combined with AND (min), OR (max) and NOT (1 - x).
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Is(Proposition),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn and(self, rhs: impl Into<Expr>) -> Self {
        Expr::And(Box::new(self), Box::new(rhs.into()))
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Self {
        Expr::Or(Box::new(self), Box::new(rhs.into()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn propositions(&self) -> Vec<&Proposition> {
        let mut props = Vec::new();

        fn parse<'p>(expr: &'p Expr, out: &mut Vec<&'p Proposition>) {
            match expr {
                Expr::Is(prop) => out.push(prop),
                Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                    parse(lhs, out);
                    parse(rhs, out);
                },
                Expr::Not(expr) => parse(expr, out),
            }
        }

        parse(self, &mut props);

        props
    }

    /// Firing strength of this expression for the bound inputs, always within [0, 1].
    pub fn eval(&self, vars: &Variables, inputs: &Inputs, and_op: AndOp, or_op: OrOp) -> Result<f64> {
        match self {
            Expr::Is(Proposition { var, term }) => {
                let variable = vars.get(Variable(*var))?;
                let value = inputs
                    .get(*var)
                    .ok_or_else(|| FuzzyError::MissingInput(variable.name().to_owned()))?;

                variable.degree_of(term, value)
            },
            Expr::And(lhs, rhs) => {
                let left = lhs.eval(vars, inputs, and_op, or_op)?;
                let right = rhs.eval(vars, inputs, and_op, or_op)?;

                Ok(and_op.call(left, right))
            },
            Expr::Or(lhs, rhs) => {
                let left = lhs.eval(vars, inputs, and_op, or_op)?;
                let right = rhs.eval(vars, inputs, and_op, or_op)?;

                Ok(or_op.call(left, right))
            },
            Expr::Not(expr) => Ok(1. - expr.eval(vars, inputs, and_op, or_op)?),
        }
    }
}

impl From<Proposition> for Expr {
    fn from(prop: Proposition) -> Self {
        Expr::Is(prop)
    }
}

impl Proposition {
    pub fn and(self, rhs: impl Into<Expr>) -> Expr {
        Expr::from(self).and(rhs)
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Expr {
        Expr::from(self).or(rhs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::from(self).not()
    }
}

impl Variable {
    pub fn is(self, term: impl Into<String>) -> Proposition {
        Proposition {
            var: self.0,
            term: term.into(),
        }
    }
}

#[cfg(test)]
fn fixture() -> (Variables, Variable, Variable) {
    use crate::terms::Shape;
    use crate::universe::Universe;

    let mut vars = Variables::new();
    let universe = Universe::new(0. ..=10., 0.1).unwrap();
    let social = vars.add_antecedent("social", universe.clone()).unwrap();
    let alone = vars.add_antecedent("alone", universe).unwrap();

    for var in [social, alone] {
        vars.add_term(var, "low", Shape::Trapezoid([0., 0., 3., 5.])).unwrap();
        vars.add_term(var, "med", Shape::Triangle([4., 5.5, 7.])).unwrap();
        vars.add_term(var, "high", Shape::Trapezoid([6., 8., 10., 10.])).unwrap();
    }

    (vars, social, alone)
}

#[test]
fn test_eval_combinators() {
    let (vars, social, alone) = fixture();
    let mut inputs = Inputs::new();

    inputs.add(social, 7.);
    inputs.add(alone, 4.);

    let eval = |expr: Expr| expr.eval(&vars, &inputs, AndOp::Min, OrOp::Max).unwrap();

    // social: high 0.5, med 0; alone: low 0.5, med 0
    assert_eq!(eval(social.is("high").into()), 0.5);
    assert_eq!(eval(social.is("high").and(alone.is("med"))), 0.);
    assert_eq!(eval(social.is("med").or(alone.is("low"))), 0.5);
    assert_eq!(eval(social.is("med").not()), 1.);
    assert_eq!(eval(alone.is("low").and(social.is("med").or(social.is("high")))), 0.5);
}

#[test]
fn test_eval_missing_input() {
    let (vars, social, alone) = fixture();
    let mut inputs = Inputs::new();

    inputs.add(social, 7.);

    let err = social
        .is("high")
        .and(alone.is("low"))
        .eval(&vars, &inputs, AndOp::Min, OrOp::Max)
        .unwrap_err();

    assert_eq!(err, FuzzyError::MissingInput("alone".into()));
}

#[test]
fn test_propositions() {
    let (_, social, alone) = fixture();
    let expr = alone.is("high").and(social.is("low").or(social.is("med").not()));
    let terms: Vec<_> = expr.propositions().into_iter().map(|p| p.term()).collect();

    assert_eq!(terms, ["high", "low", "med"]);
}
