//! Property tests for the inference engine's invariants.

use std::sync::Arc;

use fuzzy_personality::personality::{PersonalityModel, Ratings};
use fuzzy_personality::{
    Aggregation, ImplicationOp, InferenceOps, InferenceSession, MembershipFunction, Proposition, Rules, Shape,
    Universe, Variables,
};
use proptest::prelude::*;

fn arb_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        prop::array::uniform3(-20.0..20.0f64).prop_map(|mut p| {
            p.sort_by(f64::total_cmp);
            Shape::Triangle(p)
        }),
        prop::array::uniform4(-20.0..20.0f64).prop_map(|mut p| {
            p.sort_by(f64::total_cmp);
            Shape::Trapezoid(p)
        }),
    ]
}

fn arb_ratings() -> impl Strategy<Value = Ratings> {
    prop::array::uniform9(0.0..=10.0f64).prop_map(|r| Ratings {
        social: r[0],
        talk: r[1],
        confidence: r[2],
        energy: r[3],
        alone: r[4],
        initiate: r[5],
        group: r[6],
        public_speak: r[7],
        express: r[8],
    })
}

const TERMS: [Shape; 3] = [
    Shape::Triangle([0., 0., 50.]),
    Shape::Triangle([30., 50., 70.]),
    Shape::Triangle([60., 100., 100.]),
];

proptest! {
    #[test]
    fn degree_is_always_a_unit_value(shape in arb_shape(), x in -1e3..1e3f64) {
        let mf = MembershipFunction::new(shape).unwrap();
        let degree = mf.degree(x);

        prop_assert!((0.0..=1.0).contains(&degree), "{:?} at {} gave {}", shape, x, degree);
    }

    #[test]
    fn aggregation_ignores_rule_order(
        firings in prop::collection::vec((0..3usize, 0.0..=1.0f64), 1..12).prop_shuffle(),
        aggregation in prop_oneof![
            Just(Aggregation::Max),
            Just(Aggregation::ProbOr),
            Just(Aggregation::BoundedSum),
        ],
    ) {
        let universe = Universe::new(0. ..=100., 0.5).unwrap();
        let curves: Vec<Vec<f64>> = TERMS
            .iter()
            .map(|shape| MembershipFunction::new(*shape).unwrap().sample(&universe))
            .collect();
        let aggregate = |firings: &[(usize, f64)]| {
            let mut acc = vec![0.; universe.len()];

            for (term, strength) in firings {
                aggregation.accumulate(&mut acc, &ImplicationOp::Min.call(*strength, &curves[*term]));
            }

            acc
        };

        let forward = aggregate(&firings);
        let mut reversed = firings.clone();
        reversed.reverse();
        let backward = aggregate(&reversed);

        if aggregation == Aggregation::Max {
            prop_assert_eq!(forward, backward);
        } else {
            // Sums are associative up to rounding
            for (f, b) in forward.iter().zip(&backward) {
                prop_assert!((f - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn rule_base_order_does_not_change_outputs(
        order in Just(vec![0usize, 1, 2]).prop_shuffle(),
        value in 0.0..=10.0f64,
    ) {
        let mut vars = Variables::new();
        let level = vars.add_antecedent("level", Universe::new(0. ..=10., 0.1).unwrap()).unwrap();
        let score = vars.add_consequent("score", Universe::new(0. ..=100., 0.5).unwrap()).unwrap();

        let levels = [
            ("low", Shape::Trapezoid([0., 0., 3., 5.])),
            ("med", Shape::Triangle([2., 5., 8.])),
            ("high", Shape::Trapezoid([5., 7., 10., 10.])),
        ];

        for (name, shape) in levels {
            vars.add_term(level, name, shape).unwrap();
        }
        for (name, shape) in ["bottom", "middle", "top"].into_iter().zip(TERMS) {
            vars.add_term(score, name, shape).unwrap();
        }

        let vars = Arc::new(vars);
        let pairs: [(Proposition, Proposition); 3] = [
            (level.is("low"), score.is("bottom")),
            (level.is("med"), score.is("middle")),
            (level.is("high"), score.is("top")),
        ];
        let evaluate = |indices: &[usize]| {
            let mut rules = Rules::new();

            for i in indices {
                let (premise, consequence) = pairs[*i].clone();
                rules.add(premise, consequence);
            }

            let base = rules.build(Arc::clone(&vars), InferenceOps::default()).unwrap();
            let mut session = InferenceSession::new(&base);

            session.set(level, value).unwrap();

            let outputs = session.compute().unwrap();
            let crisp = outputs.crisp("score").unwrap();
            let curve = outputs.aggregated("score").unwrap().clone();

            (crisp, curve)
        };

        prop_assert_eq!(evaluate(&[0, 1, 2]), evaluate(&order));
    }

    #[test]
    fn assessments_are_bounded_and_deterministic(ratings in arb_ratings()) {
        let model = PersonalityModel::new().unwrap();

        match (model.assess(&ratings), model.assess(&ratings)) {
            (Ok(first), Ok(second)) => {
                prop_assert!((0.0..=100.0).contains(&first.orientation));
                prop_assert!((0.0..=100.0).contains(&first.stability));
                prop_assert_eq!(first, second);
            },
            (first, second) => prop_assert_eq!(first.map(|_| ()), second.map(|_| ())),
        }
    }
}
