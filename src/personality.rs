//! The shipped personality controllers: nine 0-10 ratings in, an orientation score
//! (introvert to extrovert) and an emotional stability score out, both on 0-100.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};
use crate::inference::InferenceSession;
use crate::ops::InferenceOps;
use crate::outputs::{Curve, Outputs};
use crate::rules::{RuleBase, Rules};
use crate::terms::Shape;
use crate::universe::Universe;
use crate::variable::Variables;

pub const RATING_NAMES: [&str; 9] = [
    "social",
    "talk",
    "confidence",
    "energy",
    "alone",
    "initiate",
    "group",
    "public_speak",
    "express",
];

pub const ORIENTATION: &str = "orientation";
pub const STABILITY: &str = "stability";

const LOW: Shape = Shape::Trapezoid([0., 0., 3., 5.]);
const MED: Shape = Shape::Triangle([4., 5.5, 7.]);
const HIGH: Shape = Shape::Trapezoid([6., 8., 10., 10.]);

const BOTTOM: Shape = Shape::Triangle([0., 0., 50.]);
const MIDDLE: Shape = Shape::Triangle([30., 50., 70.]);
const TOP: Shape = Shape::Triangle([60., 100., 100.]);

/// Builds the frozen registry both controllers share.
pub fn variables() -> Result<Variables> {
    let ratings = Universe::new(0. ..=10., 0.1)?;
    let scores = Universe::new(0. ..=100., 0.5)?;
    let mut vars = Variables::new();

    for name in RATING_NAMES {
        let var = vars.add_antecedent(name, ratings.clone())?;
        let [low, med, high] = match name {
            "express" => ["reserved", "balanced", "expressive"],
            _ => ["low", "med", "high"],
        };

        vars.add_term(var, low, LOW)?;
        vars.add_term(var, med, MED)?;
        vars.add_term(var, high, HIGH)?;
    }

    let orientation = vars.add_consequent(ORIENTATION, scores.clone())?;

    vars.add_term(orientation, "introvert", BOTTOM)?;
    vars.add_term(orientation, "ambivert", MIDDLE)?;
    vars.add_term(orientation, "extrovert", TOP)?;

    let stability = vars.add_consequent(STABILITY, scores)?;

    vars.add_term(stability, "low", BOTTOM)?;
    vars.add_term(stability, "balanced", MIDDLE)?;
    vars.add_term(stability, "high", TOP)?;

    Ok(vars)
}

/// The 18 orientation rules.
pub fn orientation_rules(vars: Arc<Variables>, ops: InferenceOps) -> Result<RuleBase> {
    let social = vars.variable("social")?;
    let talk = vars.variable("talk")?;
    let confidence = vars.variable("confidence")?;
    let energy = vars.variable("energy")?;
    let alone = vars.variable("alone")?;
    let initiate = vars.variable("initiate")?;
    let group = vars.variable("group")?;
    let public_speak = vars.variable("public_speak")?;
    let express = vars.variable("express")?;
    let orientation = vars.variable(ORIENTATION)?;
    let mut rules = Rules::with_capacity(18);

    // Extrovert
    rules
        .add(
            social.is("high").and(talk.is("high")).and(confidence.is("high")),
            orientation.is("extrovert"),
        )
        .add(
            initiate.is("high").and(talk.is("med").or(confidence.is("high"))),
            orientation.is("extrovert"),
        )
        .add(group.is("high").and(public_speak.is("high")), orientation.is("extrovert"))
        .add(energy.is("high").and(express.is("expressive")), orientation.is("extrovert"))
        .add(
            alone.is("low").and(social.is("high").or(initiate.is("high"))),
            orientation.is("extrovert"),
        );

    // Introvert
    rules
        .add(
            social.is("low").and(talk.is("low")).and(alone.is("high")),
            orientation.is("introvert"),
        )
        .add(group.is("low").and(public_speak.is("low")), orientation.is("introvert"))
        .add(energy.is("low").and(express.is("reserved")), orientation.is("introvert"))
        .add(initiate.is("low").and(confidence.is("low")), orientation.is("introvert"))
        .add(
            alone.is("high").and(social.is("low").or(talk.is("low"))),
            orientation.is("introvert"),
        );

    // Ambivert
    rules
        .add(social.is("med").and(talk.is("med")), orientation.is("ambivert"))
        .add(confidence.is("med").and(alone.is("med")), orientation.is("ambivert"))
        .add(group.is("med").and(public_speak.is("med")), orientation.is("ambivert"))
        .add(energy.is("med").and(express.is("balanced")), orientation.is("ambivert"))
        .add(social.is("high").and(alone.is("med")), orientation.is("ambivert"))
        .add(
            talk.is("high").and(express.is("reserved")).and(confidence.is("med")),
            orientation.is("ambivert"),
        )
        .add(
            initiate.is("med").and(group.is("med").or(public_speak.is("med"))),
            orientation.is("ambivert"),
        )
        .add(
            confidence.is("high").and(public_speak.is("low")).and(alone.is("med")),
            orientation.is("ambivert"),
        );

    rules.build(vars, ops)
}

/// The 13 stability rules. They never read `initiate`.
pub fn stability_rules(vars: Arc<Variables>, ops: InferenceOps) -> Result<RuleBase> {
    let social = vars.variable("social")?;
    let talk = vars.variable("talk")?;
    let confidence = vars.variable("confidence")?;
    let energy = vars.variable("energy")?;
    let alone = vars.variable("alone")?;
    let group = vars.variable("group")?;
    let public_speak = vars.variable("public_speak")?;
    let express = vars.variable("express")?;
    let stability = vars.variable(STABILITY)?;
    let mut rules = Rules::with_capacity(13);

    rules
        .add(confidence.is("low").and(express.is("expressive")), stability.is("low"))
        .add(energy.is("high").and(alone.is("high")), stability.is("low"))
        .add(confidence.is("low").and(energy.is("low")), stability.is("low"))
        .add(group.is("low").and(public_speak.is("low")), stability.is("low"));

    rules
        .add(confidence.is("med").and(express.is("balanced")), stability.is("balanced"))
        .add(energy.is("med").and(alone.is("med")), stability.is("balanced"))
        .add(social.is("med").and(talk.is("med")), stability.is("balanced"))
        .add(group.is("med").and(public_speak.is("med")), stability.is("balanced"));

    rules
        .add(confidence.is("high").and(express.is("balanced")), stability.is("high"))
        .add(energy.is("med").and(confidence.is("high")), stability.is("high"))
        .add(group.is("high").and(public_speak.is("high")), stability.is("high"))
        .add(alone.is("low").and(confidence.is("high")), stability.is("high"))
        .add(social.is("high").and(express.is("balanced")), stability.is("high"));

    rules.build(vars, ops)
}

/// The nine self-assessed ratings, nominally each within [0, 10].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub social: f64,
    pub talk: f64,
    pub confidence: f64,
    pub energy: f64,
    pub alone: f64,
    pub initiate: f64,
    pub group: f64,
    pub public_speak: f64,
    pub express: f64,
}

impl Ratings {
    /// Every rating set to `value`.
    pub fn uniform(value: f64) -> Self {
        Self {
            social: value,
            talk: value,
            confidence: value,
            energy: value,
            alone: value,
            initiate: value,
            group: value,
            public_speak: value,
            express: value,
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "social" => self.social,
            "talk" => self.talk,
            "confidence" => self.confidence,
            "energy" => self.energy,
            "alone" => self.alone,
            "initiate" => self.initiate,
            "group" => self.group,
            "public_speak" => self.public_speak,
            "express" => self.express,
            _ => return None,
        };

        Some(value)
    }
}

impl Default for Ratings {
    /// The neutral starting point the rating sliders open at.
    fn default() -> Self {
        Self::uniform(4.5)
    }
}

/// Where a 0-100 score falls: below 40, above 60, or in between.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Band {
    Low,
    Balanced,
    High,
}

impl Band {
    pub fn of(score: f64) -> Self {
        if score < 40. {
            Self::Low
        } else if score > 60. {
            Self::High
        } else {
            Self::Balanced
        }
    }

    pub fn orientation_label(self) -> &'static str {
        match self {
            Self::Low => "Introvert",
            Self::Balanced => "Ambivert",
            Self::High => "Extrovert",
        }
    }

    pub fn stability_label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Balanced => "Balanced",
            Self::High => "High",
        }
    }
}

/// Both scores from one set of ratings, with the aggregated curves behind them.
#[derive(Clone, Debug, PartialEq)]
pub struct Assessment {
    pub orientation: f64,
    pub stability: f64,
    pub orientation_curve: Curve,
    pub stability_curve: Curve,
}

impl Assessment {
    pub fn orientation_band(&self) -> Band {
        Band::of(self.orientation)
    }

    pub fn stability_band(&self) -> Band {
        Band::of(self.stability)
    }
}

/// The registry and both rule bases, built once and evaluated any number of times.
#[derive(Clone, Debug)]
pub struct PersonalityModel {
    vars: Arc<Variables>,
    orientation: RuleBase,
    stability: RuleBase,
}

impl PersonalityModel {
    pub fn new() -> Result<Self> {
        Self::with_ops(InferenceOps::default())
    }

    pub fn with_ops(ops: InferenceOps) -> Result<Self> {
        let vars = Arc::new(variables()?);

        Ok(Self {
            orientation: orientation_rules(Arc::clone(&vars), ops)?,
            stability: stability_rules(Arc::clone(&vars), ops)?,
            vars,
        })
    }

    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    pub fn orientation(&self) -> &RuleBase {
        &self.orientation
    }

    pub fn stability(&self) -> &RuleBase {
        &self.stability
    }

    /// Runs both controllers, each in a fresh session.
    pub fn assess(&self, ratings: &Ratings) -> Result<Assessment> {
        let orientation = run(&self.orientation, ratings)?;
        let stability = run(&self.stability, ratings)?;

        Ok(Assessment {
            orientation: orientation.crisp(ORIENTATION)?,
            stability: stability.crisp(STABILITY)?,
            orientation_curve: orientation.aggregated(ORIENTATION)?.clone(),
            stability_curve: stability.aggregated(STABILITY)?.clone(),
        })
    }

    /// Every term of `consequent` sampled over its universe, for plotting alongside a score.
    pub fn term_curves(&self, consequent: &str) -> Result<Vec<(String, Curve)>> {
        let var = self.vars.by_name(consequent)?;

        var.terms()
            .map(|(name, _)| Ok((name.to_owned(), var.term_curve(name)?)))
            .collect()
    }
}

/// Feeds a rule base only the ratings it reads.
fn run(rule_base: &RuleBase, ratings: &Ratings) -> Result<Outputs> {
    let mut session = InferenceSession::new(rule_base);

    for var in rule_base.antecedents() {
        let name = rule_base.variables().get(var)?.name();
        let value = ratings
            .get(name)
            .ok_or_else(|| FuzzyError::MissingInput(name.to_owned()))?;

        session.set(var, value)?;
    }

    let outputs = session.compute()?.clone();

    Ok(outputs)
}

#[cfg(test)]
fn model() -> PersonalityModel {
    PersonalityModel::new().unwrap()
}

#[test]
fn test_rule_counts() {
    let model = model();

    assert_eq!(model.orientation().rules().len(), 18);
    assert_eq!(model.stability().rules().len(), 13);
    assert_eq!(model.orientation().antecedents().count(), 9);
    assert_eq!(model.stability().antecedents().count(), 8);
    assert_eq!(model.variables().len(), 11);
}

#[test]
fn test_stability_never_reads_initiate() {
    let model = model();
    let initiate = model.variables().variable("initiate").unwrap();

    assert!(model.stability().antecedents().all(|var| var != initiate));
}

#[test]
fn test_all_high_is_extrovert() {
    let assessment = model().assess(&Ratings::uniform(10.)).unwrap();

    assert!(assessment.orientation > 60., "{}", assessment.orientation);
    assert_eq!(assessment.orientation_band(), Band::High);
}

#[test]
fn test_all_low_is_introvert() {
    let assessment = model().assess(&Ratings::uniform(0.)).unwrap();

    assert!(assessment.orientation < 40., "{}", assessment.orientation);
    assert_eq!(assessment.orientation_band().orientation_label(), "Introvert");
    assert!(assessment.stability < 40., "{}", assessment.stability);
}

#[test]
fn test_all_high_stability_balances_low_and_high() {
    // energy & alone both high fires "low" as hard as group & public_speak fires "high"
    let assessment = model().assess(&Ratings::uniform(10.)).unwrap();

    assert_eq!(assessment.stability_band(), Band::Balanced);
}

#[test]
fn test_all_medium_is_centered() {
    let assessment = model().assess(&Ratings::uniform(5.5)).unwrap();

    assert!((assessment.orientation - 50.).abs() < 1e-6, "{}", assessment.orientation);
    assert!((assessment.stability - 50.).abs() < 1e-6, "{}", assessment.stability);
}

#[test]
fn test_confident_extrovert() {
    let ratings = Ratings {
        social: 9.,
        talk: 8.5,
        confidence: 9.,
        energy: 8.,
        alone: 2.,
        initiate: 9.,
        group: 8.5,
        public_speak: 8.,
        express: 5.5,
    };
    let assessment = model().assess(&ratings).unwrap();

    assert_eq!(assessment.orientation_band(), Band::High);
    assert_eq!(assessment.stability_band(), Band::High);
}

#[test]
fn test_assessments_are_reproducible() {
    let model = model();
    let ratings = Ratings::default();

    assert_eq!(model.assess(&ratings).unwrap(), model.assess(&ratings).unwrap());
}

#[test]
fn test_controllers_evaluate_in_parallel() {
    let model = model();
    let ratings = Ratings {
        social: 3.5,
        talk: 6.,
        confidence: 7.5,
        energy: 4.,
        alone: 6.5,
        initiate: 5.,
        group: 2.,
        public_speak: 6.5,
        express: 8.,
    };
    let sequential = (run(model.orientation(), &ratings), run(model.stability(), &ratings));
    let parallel = std::thread::scope(|scope| {
        let orientation = scope.spawn(|| run(model.orientation(), &ratings));
        let stability = scope.spawn(|| run(model.stability(), &ratings));

        (orientation.join().unwrap(), stability.join().unwrap())
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn test_stability_can_leave_every_rule_unfired() {
    // Confidence and group on med with everything else at 0 is a mix no stability rule covers
    let ratings = Ratings {
        social: 0.,
        talk: 0.,
        confidence: 5.5,
        energy: 0.,
        alone: 0.,
        initiate: 0.,
        group: 5.5,
        public_speak: 0.,
        express: 0.,
    };
    let model = model();

    assert!(run(model.orientation(), &ratings).is_ok());
    assert_eq!(model.assess(&ratings), Err(FuzzyError::NoActiveRule(STABILITY.into())));
}

#[test]
fn test_unknown_output_name() {
    let outputs = run(model().orientation(), &Ratings::default()).unwrap();

    assert_eq!(
        outputs.crisp("bogus"),
        Err(FuzzyError::UnknownTerm {
            variable: "bogus".into(),
            term: "crisp".into()
        })
    );
    assert!(outputs.crisp(ORIENTATION).is_ok());
}

#[test]
fn test_term_curves() {
    let curves = model().term_curves(ORIENTATION).unwrap();
    let names: Vec<_> = curves.iter().map(|(name, _)| name.as_str()).collect();

    assert_eq!(names, ["introvert", "ambivert", "extrovert"]);
    assert!(curves.iter().all(|(_, curve)| curve.len() == 201));
    assert!(matches!(
        model().term_curves("mood"),
        Err(FuzzyError::UnknownVariable(_))
    ));
}

#[test]
fn test_bands() {
    assert_eq!(Band::of(39.9), Band::Low);
    assert_eq!(Band::of(40.), Band::Balanced);
    assert_eq!(Band::of(60.), Band::Balanced);
    assert_eq!(Band::of(60.1), Band::High);
    assert_eq!(Band::High.stability_label(), "High");
}

#[test]
fn test_ratings_json() {
    let ratings: Ratings = serde_json::from_str(
        r#"{"social": 1, "talk": 2, "confidence": 3, "energy": 4, "alone": 5,
            "initiate": 6, "group": 7, "public_speak": 8, "express": 9}"#,
    )
    .unwrap();

    assert_eq!(ratings.get("public_speak"), Some(8.));
    assert_eq!(ratings.get("mood"), None);
}
