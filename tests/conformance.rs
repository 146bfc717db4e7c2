use std::collections::HashMap;
use std::error::Error;

use approx::assert_relative_eq;
use fleance::operators::{And, Historically, Not, Once, Or};
use fleance::{atom, evaluate, Formula, Lookback, Monitor, Predicate, Trace};

type TestResult = Result<(), Box<dyn Error>>;

fn boolean_trace() -> Trace<HashMap<&'static str, bool>> {
    Trace::from([
        (0.0, HashMap::from([("x", true), ("y", false)])),
        (1.0, HashMap::from([("x", true), ("y", true)])),
        (2.0, HashMap::from([("x", false), ("y", true)])),
    ])
}

#[test]
fn boolean_combinators() -> TestResult {
    let trace = boolean_trace();

    let conjunction = evaluate(&trace, And::new(atom("x"), atom("y")))?;
    let disjunction = evaluate(&trace, Or::new(atom("x"), atom("y")))?;

    assert_eq!(conjunction, Trace::from([(0.0, false), (1.0, true), (2.0, false)]));
    assert_eq!(disjunction, Trace::from([(0.0, true), (1.0, true), (2.0, true)]));
    Ok(())
}

#[test]
fn de_morgan() -> TestResult {
    let trace = boolean_trace();

    let lhs = evaluate(&trace, Not::new(And::new(atom("x"), atom("y"))))?;
    let rhs = evaluate(&trace, Or::new(Not::new(atom("x")), Not::new(atom("y"))))?;

    assert_eq!(lhs, rhs);

    let trace = Trace::from([
        (0.0, HashMap::from([("x", 1.5), ("y", -0.5)])),
        (1.0, HashMap::from([("x", -2.0), ("y", 3.0)])),
        (2.0, HashMap::from([("x", 0.0), ("y", 0.0)])),
    ]);

    let lhs = evaluate(&trace, Not::new(And::new(atom("x"), atom("y"))))?;
    let rhs = evaluate(&trace, Or::new(Not::new(atom("x")), Not::new(atom("y"))))?;

    assert_eq!(lhs, rhs);
    Ok(())
}

#[test]
fn double_negation() -> TestResult {
    let trace = Trace::from([
        (0.0, HashMap::from([("x", 1.5)])),
        (1.0, HashMap::from([("x", -2.0)])),
    ]);

    let identity = evaluate(&trace, Not::new(Not::new(atom("x"))))?;
    let direct = evaluate(&trace, atom("x"))?;

    assert_eq!(identity, direct);
    Ok(())
}

#[test]
fn unbounded_past_operators() -> TestResult {
    let trace: Trace<HashMap<&str, f64>> = Trace::from_iter(
        [4.0, 2.0, 3.0, 1.0, 5.0]
            .into_iter()
            .enumerate()
            .map(|(i, value)| (i as f64, HashMap::from([("x", value)]))),
    );

    let worst = evaluate(&trace, Historically::unbounded(atom("x")))?;
    let best = evaluate(&trace, Once::unbounded(atom("x")))?;

    assert_eq!(worst, Trace::from([(0.0, 4.0), (1.0, 2.0), (2.0, 2.0), (3.0, 1.0), (4.0, 1.0)]));
    assert_eq!(best, Trace::from([(0.0, 4.0), (1.0, 4.0), (2.0, 4.0), (3.0, 4.0), (4.0, 5.0)]));
    Ok(())
}

#[test]
fn past_operator_duality() -> TestResult {
    let trace: Trace<HashMap<&str, f64>> = Trace::from_iter(
        [0.5, -1.0, 2.5, 2.0, -3.0]
            .into_iter()
            .enumerate()
            .map(|(i, value)| (i as f64, HashMap::from([("x", value)]))),
    );

    let lookback = Lookback::new(0.0, 2.0)?;

    let lhs = evaluate(&trace, Historically::bounded(lookback, atom("x")))?;
    let rhs = evaluate(&trace, Not::new(Once::bounded(lookback, Not::new(atom("x")))))?;

    assert_eq!(lhs, rhs);
    Ok(())
}

#[test]
fn shared_subformulas_monitor_independently() -> TestResult {
    let x = atom("x");
    let phi = And::new(Historically::unbounded(&x), &x);

    let mut first = Formula::<HashMap<&str, f64>>::monitor(&phi);
    let mut second = Formula::<HashMap<&str, f64>>::monitor(&phi);

    let low = HashMap::from([("x", -1.0)]);
    let high = HashMap::from([("x", 5.0)]);

    assert_eq!(first.advance(0.0, &low)?, -1.0);
    assert_eq!(first.advance(1.0, &high)?, -1.0);

    // The second monitor never saw the low sample, so its history starts clean.
    assert_eq!(second.advance(0.0, &high)?, 5.0);
    Ok(())
}

#[test]
fn windowed_requirement_over_predicate() -> TestResult {
    // speed <= 10 must have held for the last 2 time units.
    let requirement = Predicate::from([("speed", 1.0)]) + 10.0;
    let phi = Historically::bounded(Lookback::new(0.0, 2.0)?, requirement);

    let trace: Trace<HashMap<&str, f64>> = Trace::from_iter(
        [4.0, 9.0, 12.0, 8.0, 7.5, 6.0]
            .into_iter()
            .enumerate()
            .map(|(i, speed)| (i as f64, HashMap::from([("speed", speed)]))),
    );

    let robustness = evaluate(&trace, phi)?;

    assert_relative_eq!(robustness[0.0], 6.0);
    assert_relative_eq!(robustness[1.0], 1.0);
    assert_relative_eq!(robustness[2.0], -2.0);
    assert_relative_eq!(robustness[3.0], -2.0);
    assert_relative_eq!(robustness[4.0], -2.0);
    assert_relative_eq!(robustness[5.0], 2.0);
    Ok(())
}

#[test]
fn evaluation_error_reports_time() {
    let trace = Trace::from([
        (0.0, HashMap::from([("x", 1.0)])),
        (1.0, HashMap::new()),
    ]);

    let result = evaluate(&trace, atom("x"));
    let error = result.expect_err("missing variable should fail");

    assert_eq!(error.time(), 1.0);
}
