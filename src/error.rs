use thiserror::Error;

use crate::inference::SessionState;

/// Everything that can go wrong while configuring or running a fuzzy controller.
///
/// Setup variants surface while building variables and rule bases and mean the configuration
/// is broken. `MissingInput`, `SessionNotReady` and `NoActiveRule` belong to a single evaluation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FuzzyError {
    #[error("invalid {shape} control points {points:?}: must be finite and non-decreasing")]
    InvalidShape { shape: &'static str, points: Vec<f64> },

    #[error("invalid universe [{min}, {max}] with step {step}")]
    InvalidUniverse { min: f64, max: f64, step: f64 },

    #[error("term `{term}` already defined for variable `{variable}`")]
    DuplicateTerm { variable: String, term: String },

    #[error("variable `{0}` already registered")]
    DuplicateVariable(String),

    #[error("variable `{variable}` has no term `{term}`")]
    UnknownTerm { variable: String, term: String },

    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("variable `{variable}` is not an {expected}")]
    RoleMismatch { variable: String, expected: &'static str },

    #[error("no input bound for antecedent `{0}`")]
    MissingInput(String),

    #[error("session is not ready to compute (state: {0:?})")]
    SessionNotReady(SessionState),

    #[error("no rule fired for consequent `{0}`; centroid is undefined")]
    NoActiveRule(String),
}

pub type Result<T, E = FuzzyError> = std::result::Result<T, E>;
