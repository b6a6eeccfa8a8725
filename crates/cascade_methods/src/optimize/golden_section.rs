//! Golden-section search.

use anyhow::{bail, Context, Result};
use cascade_core::conditions::{StopIfNan, StopWhenEqual};
use cascade_core::engine::{Engine, EngineSettings, RunOutcome};
use cascade_core::history::Table;
use cascade_core::impl_record;
use serde::Serialize;

use crate::settings::SolverSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
struct GoldenState {
    x_lower: f64,
    x_upper: f64,
    f_lower: f64,
    f_upper: f64,
    dx: f64,
}

impl_record!(GoldenState, f64 { x_lower, x_upper, f_lower, f_upper, dx });

/// Result of a 1-D minimization.
#[derive(Debug, Clone, Serialize)]
pub struct MinimumSolution {
    pub x: f64,
    pub f: f64,
    pub iterations: usize,
    pub outcome: RunOutcome,
    pub table: Table<f64>,
}

/// Shrinks a bracket around a minimum of a unimodal function by the
/// inverse golden ratio each iteration; no derivative required. The run
/// stops when the bracket width reaches the tolerance.
pub struct GoldenSection<F: Fn(f64) -> f64> {
    function: F,
    x_lower: f64,
    x_upper: f64,
    settings: SolverSettings,
}

impl<F: Fn(f64) -> f64> GoldenSection<F> {
    pub fn new(function: F, x_lower: f64, x_upper: f64) -> Self {
        Self {
            function,
            x_lower,
            x_upper,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn solve(&self) -> Result<MinimumSolution> {
        if !self.x_lower.is_finite() || !self.x_upper.is_finite() || self.x_lower >= self.x_upper
        {
            bail!(
                "invalid search interval [{}, {}]: bounds must be finite with lower < upper",
                self.x_lower,
                self.x_upper
            );
        }

        let tolerance = self.settings.tolerance()?;
        let mut engine: Engine<f64, GoldenState> = Engine::new(
            "golden_section",
            EngineSettings {
                max_iterations: self.settings.max_iterations,
            },
        )?;
        engine.add_condition(StopWhenEqual::zero("dx", tolerance, self.settings.patience)?);
        engine.add_condition(StopIfNan::new(["f_lower", "f_upper"])?);

        let function = &self.function;
        let initial = GoldenState {
            x_lower: self.x_lower,
            x_upper: self.x_upper,
            f_lower: function(self.x_lower),
            f_upper: function(self.x_upper),
            dx: (self.x_upper - self.x_lower).abs(),
        };

        // 1/φ: interior points at x_upper - r dx and x_lower + r dx.
        let r = 2.0 / (1.0 + 5.0_f64.sqrt());
        let outcome = engine.run(initial, |history| {
            let prev = *history.last_state().context("history cannot be empty")?;
            let dx = prev.x_upper - prev.x_lower;
            let x1 = prev.x_upper - r * dx;
            let x2 = prev.x_lower + r * dx;
            let f1 = function(x1);
            let f2 = function(x2);

            let (x_lower, x_upper, f_lower, f_upper) = if f1 < f2 {
                (prev.x_lower, x2, prev.f_lower, f2)
            } else {
                (x1, prev.x_upper, f1, prev.f_upper)
            };
            Ok(GoldenState {
                x_lower,
                x_upper,
                f_lower,
                f_upper,
                dx: (x_upper - x_lower).abs(),
            })
        })?;

        let history = engine.history();
        let state = *history.last_state().context("no states were recorded")?;
        let x = (state.x_lower + state.x_upper) / 2.0;
        Ok(MinimumSolution {
            x,
            f: function(x),
            iterations: outcome.iterations,
            outcome,
            table: history.to_table(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_an_inverted_interval() {
        let err = GoldenSection::new(|x: f64| x * x, 1.0, -1.0)
            .solve()
            .expect_err("inverted interval");
        assert!(format!("{err}").contains("lower < upper"));
    }

    #[test]
    fn finds_the_parabola_minimum() {
        let solution = GoldenSection::new(|x: f64| (x - 2.0) * (x - 2.0) + 3.0, 0.0, 5.0)
            .with_settings(SolverSettings {
                patience: 1,
                ..SolverSettings::default()
            })
            .solve()
            .unwrap();
        assert!(solution.outcome.status.is_stopped());
        assert!((solution.x - 2.0).abs() < 1e-4);
        assert!((solution.f - 3.0).abs() < 1e-6);
    }

    #[test]
    fn the_bracket_shrinks_by_the_golden_ratio() {
        let solution = GoldenSection::new(|x: f64| x * x, -1.0, 1.0).solve().unwrap();
        let rows = &solution.table.rows;
        let dx_col = 4; // x_lower, x_upper, f_lower, f_upper, dx
        let ratio = rows[1][dx_col] / rows[0][dx_col];
        assert!((ratio - 0.618_033_988_7).abs() < 1e-6);
    }
}
