//! Gradient descent with a finite-difference gradient.

use anyhow::{bail, Context, Result};
use cascade_core::conditions::{StopIfNan, StopOnMagnitudeJump, StopWhenEqual};
use cascade_core::engine::{Engine, EngineSettings, RunOutcome};
use cascade_core::history::Table;
use cascade_core::record::VarMap;
use serde::Serialize;

use crate::settings::SolverSettings;

/// Result of an n-dimensional minimization.
#[derive(Debug, Clone, Serialize)]
pub struct DescentSolution {
    pub x: Vec<f64>,
    pub f: f64,
    pub gradient_norm: f64,
    pub iterations: usize,
    pub outcome: RunOutcome,
    pub table: Table<f64>,
}

/// x ← x - η ∇f(x), with ∇f approximated by central differences.
///
/// Convergence is a vanishing gradient norm; a gradient norm exploding by
/// orders of magnitude (a too-large learning rate) ends the run through
/// the divergence guard.
pub struct GradientDescent<F: Fn(&[f64]) -> f64> {
    function: F,
    initial_guess: Vec<f64>,
    learning_rate: f64,
    settings: SolverSettings,
}

impl<F: Fn(&[f64]) -> f64> GradientDescent<F> {
    pub fn new(function: F, initial_guess: Vec<f64>, learning_rate: f64) -> Self {
        Self {
            function,
            initial_guess,
            learning_rate,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn solve(&self) -> Result<DescentSolution> {
        if self.initial_guess.is_empty() {
            bail!("initial guess must have at least one coordinate");
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            bail!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            );
        }

        let n = self.initial_guess.len();
        let names: Vec<String> = (0..n).map(|i| format!("x_{i}")).collect();
        let tolerance = self.settings.tolerance()?;
        let mut engine: Engine<f64, VarMap<f64>> = Engine::new(
            "gradient_descent",
            EngineSettings {
                max_iterations: self.settings.max_iterations,
            },
        )?;
        engine.add_condition(StopWhenEqual::zero(
            "grad_norm",
            tolerance,
            self.settings.patience,
        )?);
        engine.add_condition(StopOnMagnitudeJump::new(
            "grad_norm",
            2,
            self.settings.patience,
        )?);
        engine.add_condition(StopIfNan::new(["f", "grad_norm"])?);

        let function = &self.function;
        let rate = self.learning_rate;
        let initial = pack(&names, &self.initial_guess, function);
        let outcome = engine.run(initial, |history| {
            let state = history.last_state().context("history cannot be empty")?;
            let mut x = unpack(state, &names)?;
            let gradient = central_difference_gradient(function, &x);
            for (xi, gi) in x.iter_mut().zip(gradient.iter()) {
                *xi -= rate * gi;
            }
            Ok(pack(&names, &x, function))
        })?;

        let history = engine.history();
        let state = history.last_state().context("no states were recorded")?;
        let x = unpack(state, &names)?;
        let f = history.latest("f")?.context("no states were recorded")?;
        let gradient_norm = history
            .latest("grad_norm")?
            .context("no states were recorded")?;
        Ok(DescentSolution {
            x,
            f,
            gradient_norm,
            iterations: outcome.iterations,
            outcome,
            table: history.to_table(),
        })
    }
}

fn pack<F: Fn(&[f64]) -> f64>(names: &[String], x: &[f64], function: &F) -> VarMap<f64> {
    let mut state = VarMap::new();
    for (name, value) in names.iter().zip(x.iter()) {
        state.insert(name.clone(), *value);
    }
    let gradient = central_difference_gradient(function, x);
    let norm = gradient.iter().map(|g| g * g).sum::<f64>().sqrt();
    state.with("f", function(x)).with("grad_norm", norm)
}

fn unpack(state: &VarMap<f64>, names: &[String]) -> Result<Vec<f64>> {
    names
        .iter()
        .map(|name| {
            state
                .get(name)
                .with_context(|| format!("variable '{name}' missing from state"))
        })
        .collect()
}

/// ∂f/∂x_j ≈ (f(x + h e_j) - f(x - h e_j)) / 2h with h scaled per
/// coordinate.
fn central_difference_gradient<F: Fn(&[f64]) -> f64>(function: &F, x: &[f64]) -> Vec<f64> {
    let h_scale = f64::EPSILON.cbrt();
    let mut gradient = Vec::with_capacity(x.len());
    let mut probe = x.to_vec();
    for j in 0..x.len() {
        let h = h_scale * x[j].abs().max(1.0);
        probe[j] = x[j] + h;
        let forward = function(&probe);
        probe[j] = x[j] - h;
        let backward = function(&probe);
        probe[j] = x[j];
        gradient.push((forward - backward) / (2.0 * h));
    }
    gradient
}
