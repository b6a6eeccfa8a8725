//! End-to-end root-finding scenarios through the public API.

use cascade_methods::root_finding::{Bisection, FalsePosition, FixedPoint, NewtonRaphson, Secant};
use cascade_methods::settings::SolverSettings;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

fn tight() -> SolverSettings {
    SolverSettings {
        patience: 1,
        ..SolverSettings::default()
    }
}

#[test]
fn bisection_halves_the_bracket_every_iteration() {
    // f(0) = -2, f(2) = 2: the bracket [0, 2] halves each step, so the
    // recorded bracket_size at iteration N is exactly 2 / 2^N.
    let solution = Bisection::new(|x| x * x - 2.0, 0.0, 2.0)
        .with_settings(tight())
        .solve()
        .unwrap();

    let columns = &solution.table.columns;
    let size_col = columns.iter().position(|c| c == "bracket_size").unwrap();
    for (n, row) in solution.table.rows.iter().enumerate() {
        let expected = 2.0 / 2.0_f64.powi(n as i32);
        assert!(
            (row[size_col] - expected).abs() < 1e-15,
            "iteration {n}: bracket_size {} != {expected}",
            row[size_col]
        );
    }

    // The run terminated on the residual or width reaching tolerance.
    assert!(solution.outcome.status.is_stopped());
    assert!((solution.root - SQRT_2).abs() < 1e-5);
}

#[test]
fn every_open_and_bracketing_method_agrees_on_sqrt_two() {
    let f = |x: f64| x * x - 2.0;

    let bisection = Bisection::new(f, 0.0, 2.0)
        .with_settings(tight())
        .solve()
        .unwrap();
    let false_position = FalsePosition::new(f, 0.0, 2.0)
        .with_settings(tight())
        .solve()
        .unwrap();
    let newton = NewtonRaphson::new(f, |x| 2.0 * x, 1.0)
        .with_settings(tight())
        .solve()
        .unwrap();
    let secant = Secant::new(f, 1.0, 2.0).with_settings(tight()).solve().unwrap();
    // Babylonian map: the fixed point of g(x) = (x + 2/x)/2 is sqrt(2).
    let fixed_point = FixedPoint::new(|x| (x + 2.0 / x) / 2.0, 1.0)
        .with_settings(tight())
        .solve()
        .unwrap();

    for (label, solution) in [
        ("bisection", &bisection),
        ("false_position", &false_position),
        ("newton", &newton),
        ("secant", &secant),
        ("fixed_point", &fixed_point),
    ] {
        assert!(
            (solution.root - SQRT_2).abs() < 1e-4,
            "{label} found {} instead of {SQRT_2}",
            solution.root
        );
    }

    // Newton converges in far fewer iterations than bisection.
    assert!(newton.iterations < bisection.iterations);
}

#[test]
fn reruns_reproduce_identical_histories() {
    let solver = Bisection::new(|x| x * x - 2.0, 0.0, 2.0).with_settings(tight());
    let first = solver.solve().unwrap();
    let second = solver.solve().unwrap();
    assert_eq!(first.table, second.table);
    assert_eq!(first.outcome, second.outcome);
}

#[test]
fn the_stop_report_names_every_condition() {
    let solution = Bisection::new(|x| x * x - 2.0, 0.0, 2.0)
        .with_settings(tight())
        .solve()
        .unwrap();
    let conditions: Vec<&str> = solution
        .outcome
        .reports
        .iter()
        .map(|r| r.condition.as_str())
        .collect();
    assert_eq!(
        conditions,
        vec!["StopWhenEqual", "StopWhenEqual", "StopIfNan"]
    );
    assert!(solution.outcome.reports.iter().any(|r| r.met));
}
