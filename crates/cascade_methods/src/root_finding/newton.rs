//! Newton-Raphson iteration.

use anyhow::{bail, Context, Result};
use cascade_core::conditions::{StopIfNan, StopWhenEqual};
use cascade_core::engine::{Engine, EngineSettings};
use cascade_core::impl_record;

use crate::root_finding::RootSolution;
use crate::settings::SolverSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
struct NewtonState {
    x: f64,
    f: f64,
    df_dx: f64,
}

impl_record!(NewtonState, f64 { x, f, df_dx });

/// x_{n+1} = x_n - f(x_n) / f'(x_n).
///
/// The derivative is supplied by the caller as a second closure; a
/// vanishing derivative aborts the step (the partial history stays
/// available on the engine, but the run fails loudly).
pub struct NewtonRaphson<F, D>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    function: F,
    derivative: D,
    x0: f64,
    settings: SolverSettings,
}

impl<F, D> NewtonRaphson<F, D>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    pub fn new(function: F, derivative: D, x0: f64) -> Self {
        Self {
            function,
            derivative,
            x0,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn solve(&self) -> Result<RootSolution> {
        if !self.x0.is_finite() {
            bail!("starting point must be finite, got {}", self.x0);
        }

        let tolerance = self.settings.tolerance()?;
        let mut engine: Engine<f64, NewtonState> = Engine::new(
            "newton_raphson",
            EngineSettings {
                max_iterations: self.settings.max_iterations,
            },
        )?;
        engine.add_condition(StopWhenEqual::zero("f", tolerance, self.settings.patience)?);
        engine.add_condition(StopIfNan::new(["x", "f", "df_dx"])?);

        let function = &self.function;
        let derivative = &self.derivative;
        let initial = NewtonState {
            x: self.x0,
            f: function(self.x0),
            df_dx: derivative(self.x0),
        };

        let outcome = engine.run(initial, |history| {
            let prev = *history.last_state().context("history cannot be empty")?;
            if prev.df_dx == 0.0 {
                bail!("derivative vanished at x = {}", prev.x);
            }
            let x = prev.x - prev.f / prev.df_dx;
            Ok(NewtonState {
                x,
                f: function(x),
                df_dx: derivative(x),
            })
        });

        let history = engine.history();
        let root = history.latest("x")?.context("no states were recorded")?;
        let f_root = history.latest("f")?.context("no states were recorded")?;
        let outcome = outcome?;
        Ok(RootSolution {
            root,
            f_root,
            iterations: outcome.iterations,
            outcome,
            table: history.to_table(),
        })
    }
}
