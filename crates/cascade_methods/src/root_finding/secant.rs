//! Secant iteration.

use anyhow::{bail, Context, Result};
use cascade_core::conditions::{StopIfNan, StopWhenEqual};
use cascade_core::engine::{Engine, EngineSettings};
use cascade_core::impl_record;

use crate::root_finding::RootSolution;
use crate::settings::SolverSettings;

/// Two-point state: the current iterate and its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SecantState {
    x_prev: f64,
    x: f64,
    f_prev: f64,
    f: f64,
    dx: f64,
}

impl_record!(SecantState, f64 { x_prev, x, f_prev, f, dx });

/// x_{n+1} = x_n - f(x_n) (x_n - x_{n-1}) / (f(x_n) - f(x_{n-1})).
///
/// Needs two starting points; a flat secant (equal function values at the
/// two iterates) aborts the step.
pub struct Secant<F: Fn(f64) -> f64> {
    function: F,
    x0: f64,
    x1: f64,
    settings: SolverSettings,
}

impl<F: Fn(f64) -> f64> Secant<F> {
    pub fn new(function: F, x0: f64, x1: f64) -> Self {
        Self {
            function,
            x0,
            x1,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn solve(&self) -> Result<RootSolution> {
        if !self.x0.is_finite() || !self.x1.is_finite() {
            bail!(
                "starting points must be finite, got {} and {}",
                self.x0,
                self.x1
            );
        }
        if self.x0 == self.x1 {
            bail!("starting points must be distinct, got {} twice", self.x0);
        }

        let tolerance = self.settings.tolerance()?;
        let mut engine: Engine<f64, SecantState> = Engine::new(
            "secant",
            EngineSettings {
                max_iterations: self.settings.max_iterations,
            },
        )?;
        engine.add_condition(StopWhenEqual::zero("f", tolerance, self.settings.patience)?);
        engine.add_condition(StopWhenEqual::zero("dx", tolerance, 1)?);
        engine.add_condition(StopIfNan::new(["x", "f"])?);

        let function = &self.function;
        let initial = SecantState {
            x_prev: self.x0,
            x: self.x1,
            f_prev: function(self.x0),
            f: function(self.x1),
            dx: (self.x1 - self.x0).abs(),
        };

        let outcome = engine.run(initial, |history| {
            let prev = *history.last_state().context("history cannot be empty")?;
            if prev.f == prev.f_prev {
                bail!(
                    "flat secant: f({}) = f({}) = {}",
                    prev.x_prev,
                    prev.x,
                    prev.f
                );
            }
            let x = prev.x - prev.f * (prev.x - prev.x_prev) / (prev.f - prev.f_prev);
            Ok(SecantState {
                x_prev: prev.x,
                x,
                f_prev: prev.f,
                f: function(x),
                dx: (x - prev.x).abs(),
            })
        })?;

        let history = engine.history();
        let root = history.latest("x")?.context("no states were recorded")?;
        let f_root = history.latest("f")?.context("no states were recorded")?;
        Ok(RootSolution {
            root,
            f_root,
            iterations: outcome.iterations,
            outcome,
            table: history.to_table(),
        })
    }
}
