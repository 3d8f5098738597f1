//! Mamdani fuzzy inference over piecewise-linear linguistic variables, plus the two shipped
//! personality controllers built on it.
//!
//! ```
//! use fuzzy_personality::personality::{Band, PersonalityModel, Ratings};
//!
//! let model = PersonalityModel::new()?;
//! let assessment = model.assess(&Ratings::uniform(10.))?;
//!
//! assert_eq!(assessment.orientation_band(), Band::High);
//! # Ok::<(), fuzzy_personality::FuzzyError>(())
//! ```

mod dsl;
mod error;
mod inference;
mod inputs;
mod linspace;
mod math;
mod ops;
mod outputs;
mod rules;
mod terms;
mod universe;
mod variable;

pub mod personality;

pub use dsl::{Expr, Proposition};
pub use error::{FuzzyError, Result};
pub use inference::{InferenceSession, SessionState};
pub use inputs::Inputs;
pub use ops::{Aggregation, AndOp, Defuzzification, ImplicationOp, InferenceOps, OrOp};
pub use outputs::{Curve, Inferred, Outputs};
pub use rules::{Rule, RuleBase, Rules};
pub use terms::{MembershipFunction, Shape};
pub use universe::Universe;
pub use variable::{LinguisticVariable, Role, Variable, VariableKey, Variables};
