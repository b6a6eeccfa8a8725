//! Newton's method for F(x) = 0 with a finite-difference Jacobian.

use anyhow::{anyhow, bail, Context, Result};
use cascade_core::conditions::{StopIfNan, StopOnMagnitudeJump, StopWhenEqual};
use cascade_core::engine::{Engine, EngineSettings, RunOutcome};
use cascade_core::history::Table;
use cascade_core::record::VarMap;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::settings::SolverSettings;

/// Outcome of a nonlinear system solve.
#[derive(Debug, Clone, Serialize)]
pub struct SystemSolution {
    pub solution: Vec<f64>,
    pub residual: f64,
    pub iterations: usize,
    pub outcome: RunOutcome,
    pub table: Table<f64>,
}

/// X_{k+1} = X_k - J(X_k)^{-1} F(X_k), with J approximated by forward
/// differences and each update solved by LU decomposition.
///
/// Besides residual convergence, a run carries a NaN guard on every
/// coordinate and an order-of-magnitude guard on the residual, so a
/// diverging iteration ends with an explanation instead of running to the
/// cap.
pub struct NewtonSystem<F: Fn(&DVector<f64>) -> DVector<f64>> {
    system: F,
    initial_guess: DVector<f64>,
    settings: SolverSettings,
}

impl<F: Fn(&DVector<f64>) -> DVector<f64>> NewtonSystem<F> {
    pub fn new(system: F, initial_guess: DVector<f64>) -> Self {
        Self {
            system,
            initial_guess,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn solve(&self) -> Result<SystemSolution> {
        let n = self.initial_guess.len();
        if n == 0 {
            bail!("initial guess must have at least one component");
        }
        let f0 = (self.system)(&self.initial_guess);
        if f0.len() != n {
            bail!(
                "system returns {} components for {} unknowns; it must be square",
                f0.len(),
                n
            );
        }

        let names: Vec<String> = (0..n).map(|i| format!("x_{i}")).collect();
        let tolerance = self.settings.tolerance()?;
        let mut engine: Engine<f64, VarMap<f64>> = Engine::new(
            "newton_system",
            EngineSettings {
                max_iterations: self.settings.max_iterations,
            },
        )?;
        engine.add_condition(StopWhenEqual::zero(
            "residual",
            tolerance,
            self.settings.patience,
        )?);
        engine.add_condition(StopOnMagnitudeJump::new(
            "residual",
            1,
            self.settings.patience,
        )?);
        let mut tracked = names.clone();
        tracked.push("residual".to_string());
        engine.add_condition(StopIfNan::new(tracked)?);

        let system = &self.system;
        let initial = pack(&names, &self.initial_guess, f0.norm());
        let outcome = engine.run(initial, |history| {
            let state = history.last_state().context("history cannot be empty")?;
            let x = unpack(state, &names)?;
            let fx = system(&x);

            let jacobian = forward_difference_jacobian(system, &x, &fx);
            let delta = jacobian
                .lu()
                .solve(&fx)
                .ok_or_else(|| anyhow!("Jacobian is singular at {:?}", x.as_slice()))?;
            let next = &x - delta;
            let residual = system(&next).norm();
            Ok(pack(&names, &next, residual))
        })?;

        let history = engine.history();
        let state = history.last_state().context("no states were recorded")?;
        let solution = unpack(state, &names)?;
        let residual = history
            .latest("residual")?
            .context("no states were recorded")?;
        Ok(SystemSolution {
            solution: solution.iter().copied().collect(),
            residual,
            iterations: outcome.iterations,
            outcome,
            table: history.to_table(),
        })
    }
}

fn pack(names: &[String], x: &DVector<f64>, residual: f64) -> VarMap<f64> {
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

/// J[.][j] ≈ (F(x + h e_j) - F(x)) / h with h scaled to the component.
fn forward_difference_jacobian<F: Fn(&DVector<f64>) -> DVector<f64>>(
    system: &F,
    x: &DVector<f64>,
    fx: &DVector<f64>,
) -> DMatrix<f64> {
    let n = x.len();
    let mut jacobian = DMatrix::zeros(n, n);
    let sqrt_eps = f64::EPSILON.sqrt();
    for j in 0..n {
        let h = sqrt_eps * x[j].abs().max(1.0);
        let mut shifted = x.clone();
        shifted[j] += h;
        let column = (system(&shifted) - fx) / h;
        jacobian.set_column(j, &column);
    }
    jacobian
}
