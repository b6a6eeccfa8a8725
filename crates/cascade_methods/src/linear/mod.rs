//! Iterative solution of square linear systems Ax = b.
//!
//! Jacobi and Gauss-Seidel share everything but the sweep: the runtime
//! state schema (`x_0`..`x_{n-1}` plus the residual), the validation, and
//! the stop conditions. The schema is only known at runtime, so these
//! solvers record [`VarMap`] states rather than fixed structs.

pub mod gauss_seidel;
pub mod jacobi;

pub use gauss_seidel::GaussSeidel;
pub use jacobi::Jacobi;

use anyhow::{bail, Context, Result};
use cascade_core::conditions::{StopIfNan, StopWhenEqual};
use cascade_core::engine::{Engine, EngineSettings, RunOutcome};
use cascade_core::history::Table;
use cascade_core::record::VarMap;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::settings::SolverSettings;

/// Outcome of an iterative linear solve.
#[derive(Debug, Clone, Serialize)]
pub struct LinearSolution {
    pub solution: Vec<f64>,
    pub residual: f64,
    pub iterations: usize,
    pub outcome: RunOutcome,
    pub table: Table<f64>,
}

fn validate_system(a: &DMatrix<f64>, b: &DVector<f64>, x0: &DVector<f64>) -> Result<()> {
    if a.nrows() == 0 {
        bail!("system must have at least one equation");
    }
    if a.nrows() != a.ncols() {
        bail!(
            "coefficient matrix must be square, got {}x{}",
            a.nrows(),
            a.ncols()
        );
    }
    if b.len() != a.nrows() {
        bail!(
            "right-hand side has {} entries for a {}-equation system",
            b.len(),
            a.nrows()
        );
    }
    if x0.len() != a.nrows() {
        bail!(
            "initial guess has {} entries for a {}-unknown system",
            x0.len(),
            a.nrows()
        );
    }
    for i in 0..a.nrows() {
        if a[(i, i)] == 0.0 {
            bail!("zero diagonal entry a[{i}][{i}]: the sweep would divide by zero");
        }
    }
    Ok(())
}

fn residual_norm(a: &DMatrix<f64>, b: &DVector<f64>, x: &DVector<f64>) -> f64 {
    (b - a * x).norm()
}

fn solution_state(names: &[String], x: &DVector<f64>, residual: f64) -> VarMap<f64> {
    let mut state = VarMap::new();
    for (name, value) in names.iter().zip(x.iter()) {
        state.insert(name.clone(), *value);
    }
    state.with("residual", residual)
}

fn unpack(state: &VarMap<f64>, names: &[String]) -> Result<DVector<f64>> {
    let mut x = DVector::zeros(names.len());
    for (i, name) in names.iter().enumerate() {
        x[i] = state
            .get(name)
            .with_context(|| format!("variable '{name}' missing from state"))?;
    }
    Ok(x)
}

/// Shared engine driver; `sweep` maps the current iterate to the next one.
fn run_linear(
    label: &'static str,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: &DVector<f64>,
    settings: &SolverSettings,
    sweep: &dyn Fn(&DMatrix<f64>, &DVector<f64>, &DVector<f64>) -> DVector<f64>,
) -> Result<LinearSolution> {
    validate_system(a, b, x0)?;

    let names: Vec<String> = (0..a.nrows()).map(|i| format!("x_{i}")).collect();
    let tolerance = settings.tolerance()?;
    let mut engine: Engine<f64, VarMap<f64>> = Engine::new(
        label,
        EngineSettings {
            max_iterations: settings.max_iterations,
        },
    )?;
    engine.add_condition(StopWhenEqual::zero(
        "residual",
        tolerance,
        settings.patience,
    )?);
    engine.add_condition(StopIfNan::new(["residual"])?);

    let initial = solution_state(&names, x0, residual_norm(a, b, x0));
    let outcome = engine.run(initial, |history| {
        let state = history.last_state().context("history cannot be empty")?;
        let x = unpack(state, &names)?;
        let next = sweep(a, b, &x);
        Ok(solution_state(&names, &next, residual_norm(a, b, &next)))
    })?;

    let history = engine.history();
    let state = history.last_state().context("no states were recorded")?;
    let solution = unpack(state, &names)?;
    let residual = history
        .latest("residual")?
        .context("no states were recorded")?;
    Ok(LinearSolution {
        solution: solution.iter().copied().collect(),
        residual,
        iterations: outcome.iterations,
        outcome,
        table: history.to_table(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_malformed_systems() {
        let square = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let rect = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let b2 = DVector::from_vec(vec![1.0, 2.0]);
        let b1 = DVector::from_vec(vec![1.0]);

        assert!(validate_system(&rect, &b1, &b2).is_err());
        assert!(validate_system(&square, &b1, &b2).is_err());
        assert!(validate_system(&square, &b2, &b1).is_err());

        let zero_diag = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 3.0]);
        let err = validate_system(&zero_diag, &b2, &b2).expect_err("zero diagonal");
        assert!(format!("{err}").contains("diagonal"));
    }

    #[test]
    fn state_round_trips_through_the_var_map() {
        let names = vec!["x_0".to_string(), "x_1".to_string()];
        let x = DVector::from_vec(vec![1.5, -2.5]);
        let state = solution_state(&names, &x, 0.25);
        assert_eq!(state.get("residual"), Some(0.25));
        assert_eq!(unpack(&state, &names).unwrap(), x);
    }
}
