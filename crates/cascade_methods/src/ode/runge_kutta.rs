//! Fixed-step explicit Runge-Kutta integrator.

use anyhow::{bail, Context, Result};
use cascade_core::conditions::{StopIfAbove, StopIfNan};
use cascade_core::engine::{Engine, EngineSettings, RunOutcome};
use cascade_core::history::Table;
use cascade_core::impl_record;
use serde::Serialize;

use crate::ode::tableau::ButcherTableau;

#[derive(Debug, Clone, Copy, PartialEq)]
struct OdeState {
    t: f64,
    y: f64,
    dy_dt: f64,
}

impl_record!(OdeState, f64 { t, y, dy_dt });

/// Result of an integration: the endpoint plus the full trajectory.
#[derive(Debug, Clone, Serialize)]
pub struct OdeSolution {
    pub t: f64,
    pub y: f64,
    /// Accepted steps (the initial condition is iteration 0).
    pub steps: usize,
    pub outcome: RunOutcome,
    pub table: Table<f64>,
}

/// Integrates dy/dt = f(t, y) from (t0, y0) to t_final with fixed step h,
/// using any explicit [`ButcherTableau`].
///
/// The run ends through a threshold condition on t rather than a counted
/// loop, so a NaN in the state ends it the same explained way as any
/// other stop.
pub struct RungeKutta<F: Fn(f64, f64) -> f64> {
    derivative: F,
    tableau: ButcherTableau,
    y0: f64,
    t0: f64,
    t_final: f64,
    h: f64,
}

impl<F: Fn(f64, f64) -> f64> RungeKutta<F> {
    pub fn new(derivative: F, tableau: ButcherTableau, y0: f64, t0: f64, t_final: f64, h: f64) -> Self {
        Self {
            derivative,
            tableau,
            y0,
            t0,
            t_final,
            h,
        }
    }

    pub fn integrate(&self) -> Result<OdeSolution> {
        if !self.h.is_finite() || self.h <= 0.0 {
            bail!("step size h must be finite and > 0, got {}", self.h);
        }
        if !self.t0.is_finite() || !self.t_final.is_finite() || self.t_final <= self.t0 {
            bail!(
                "integration span must be finite with t_final > t0, got [{}, {}]",
                self.t0,
                self.t_final
            );
        }

        let span_steps = ((self.t_final - self.t0) / self.h).ceil() as usize;
        let mut engine: Engine<f64, OdeState> = Engine::new(
            "runge_kutta",
            EngineSettings {
                // One spare step absorbs floating-point drift in t.
                max_iterations: span_steps + 1,
            },
        )?;
        // t has advanced past t_final - h/2 exactly when the final step
        // has been taken.
        engine.add_condition(StopIfAbove::new("t", self.t_final - self.h / 2.0, 1)?);
        engine.add_condition(StopIfNan::new(["y", "dy_dt"])?);

        let f = &self.derivative;
        let tableau = &self.tableau;
        let h = self.h;
        let initial = OdeState {
            t: self.t0,
            y: self.y0,
            dy_dt: f(self.t0, self.y0),
        };

        let outcome = engine.run(initial, |history| {
            let prev = *history.last_state().context("history cannot be empty")?;
            let stages = tableau.stages();
            let (a, b, c) = (tableau.a(), tableau.b(), tableau.c());

            let mut k = vec![0.0; stages];
            for i in 0..stages {
                let mut y_stage = prev.y;
                for j in 0..i {
                    y_stage += h * a[i][j] * k[j];
                }
                k[i] = f(prev.t + c[i] * h, y_stage);
            }

            let mut y = prev.y;
            for i in 0..stages {
                y += h * b[i] * k[i];
            }
            let t = prev.t + h;
            Ok(OdeState {
                t,
                y,
                dy_dt: f(t, y),
            })
        })?;

        let history = engine.history();
        let t = history.latest("t")?.context("no states were recorded")?;
        let y = history.latest("y")?.context("no states were recorded")?;
        Ok(OdeSolution {
            t,
            y,
            steps: outcome.iterations,
            outcome,
            table: history.to_table(),
        })
    }
}
