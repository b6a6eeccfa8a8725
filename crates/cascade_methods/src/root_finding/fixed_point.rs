//! Fixed-point iteration x ← g(x).

use anyhow::{bail, Context, Result};
use cascade_core::conditions::{StopAtPlateau, StopIfNan, StopOnMagnitudeJump};
use cascade_core::engine::{Engine, EngineSettings};
use cascade_core::impl_record;

use crate::root_finding::RootSolution;
use crate::settings::SolverSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
struct FixedPointState {
    x: f64,
    g_x: f64,
    dx: f64,
}

impl_record!(FixedPointState, f64 { x, g_x, dx });

/// Iterates x_{n+1} = g(x_n) to a fixed point of g.
///
/// Convergence is a plateau of the iterate; a growing step size is treated
/// as divergence (|g'| > 1 near the starting point) and ends the run
/// through the order-of-magnitude guard instead of wandering until the
/// iteration cap.
pub struct FixedPoint<G: Fn(f64) -> f64> {
    map: G,
    x0: f64,
    settings: SolverSettings,
}

impl<G: Fn(f64) -> f64> FixedPoint<G> {
    pub fn new(map: G, x0: f64) -> Self {
        Self {
            map,
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
        let mut engine: Engine<f64, FixedPointState> = Engine::new(
            "fixed_point",
            EngineSettings {
                max_iterations: self.settings.max_iterations,
            },
        )?;
        engine.add_condition(StopAtPlateau::new("x", tolerance, self.settings.patience)?);
        engine.add_condition(StopOnMagnitudeJump::new("dx", 2, self.settings.patience)?);
        engine.add_condition(StopIfNan::new(["x", "g_x"])?);

        let map = &self.map;
        let g0 = map(self.x0);
        let initial = FixedPointState {
            x: self.x0,
            g_x: g0,
            dx: (g0 - self.x0).abs(),
        };

        let outcome = engine.run(initial, |history| {
            let prev = *history.last_state().context("history cannot be empty")?;
            let x = prev.g_x;
            let g_x = map(x);
            Ok(FixedPointState {
                x,
                g_x,
                dx: (g_x - x).abs(),
            })
        })?;

        let history = engine.history();
        let root = history.latest("x")?.context("no states were recorded")?;
        let residual = history.latest("dx")?.context("no states were recorded")?;
        Ok(RootSolution {
            root,
            f_root: residual,
            iterations: outcome.iterations,
            outcome,
            table: history.to_table(),
        })
    }
}
