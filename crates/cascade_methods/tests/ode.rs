//! Integration scenarios for the Runge-Kutta family.

use cascade_methods::ode::{ButcherTableau, RungeKutta};

#[test]
fn higher_order_tableaux_are_more_accurate_on_the_same_grid() {
    // dy/dt = y, y(0) = 1, y(1) = e.
    let exact = std::f64::consts::E;
    let run = |tableau: ButcherTableau| {
        RungeKutta::new(|_, y| y, tableau, 1.0, 0.0, 1.0, 0.05)
            .integrate()
            .unwrap()
    };

    let euler = (run(ButcherTableau::euler()).y - exact).abs();
    let heun = (run(ButcherTableau::heun()).y - exact).abs();
    let rk4 = (run(ButcherTableau::rk4()).y - exact).abs();

    assert!(rk4 < heun);
    assert!(heun < euler);
    assert!(rk4 < 1e-6);
}

#[test]
fn a_user_defined_tableau_integrates_like_the_built_ins() {
    // Kutta's third-order method.
    let rk3 = ButcherTableau::new(
        vec![
            vec![0.0, 0.0, 0.0],
            vec![0.5, 0.0, 0.0],
            vec![-1.0, 2.0, 0.0],
        ],
        vec![1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0],
        vec![0.0, 0.5, 1.0],
    )
    .unwrap();

    let exact = std::f64::consts::E;
    let solution = RungeKutta::new(|_, y| y, rk3, 1.0, 0.0, 1.0, 0.05)
        .integrate()
        .unwrap();
    assert!((solution.y - exact).abs() < 1e-4);
}

#[test]
fn exponential_decay_reaches_the_final_time() {
    // dy/dt = -2y, y(0) = 1, y(2) = e^-4.
    let solution = RungeKutta::new(|_, y| -2.0 * y, ButcherTableau::rk4(), 1.0, 0.0, 2.0, 0.01)
        .integrate()
        .unwrap();
    assert!((solution.t - 2.0).abs() < 1e-9);
    assert!((solution.y - (-4.0_f64).exp()).abs() < 1e-9);
    assert_eq!(solution.steps, 200);
}

#[test]
fn a_time_dependent_derivative_is_integrated_correctly() {
    // dy/dt = 2t, y(0) = 0 → y(1) = 1; RK4 is exact for this quadratic.
    let solution = RungeKutta::new(|t, _| 2.0 * t, ButcherTableau::rk4(), 0.0, 0.0, 1.0, 0.1)
        .integrate()
        .unwrap();
    assert!((solution.y - 1.0).abs() < 1e-12);
}
