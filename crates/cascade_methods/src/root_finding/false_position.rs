//! False position (regula falsi).

use anyhow::Result;

use crate::root_finding::bracket::run_bracketing;
use crate::root_finding::RootSolution;
use crate::settings::SolverSettings;

/// Finds a root inside a sign-changing bracket by placing the trial point
/// where the secant line through the endpoints crosses zero, instead of at
/// the midpoint. Converges faster than bisection on well-behaved
/// functions; the bracket width need not shrink to zero, so convergence is
/// decided by the residual.
pub struct FalsePosition<F: Fn(f64) -> f64> {
    function: F,
    lower: f64,
    upper: f64,
    settings: SolverSettings,
}

impl<F: Fn(f64) -> f64> FalsePosition<F> {
    pub fn new(function: F, lower: f64, upper: f64) -> Self {
        Self {
            function,
            lower,
            upper,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn solve(&self) -> Result<RootSolution> {
        run_bracketing(
            "false_position",
            &self.function,
            self.lower,
            self.upper,
            &self.settings,
            &|lower, upper, f_lower, f_upper| {
                upper - f_upper * (lower - upper) / (f_lower - f_upper)
            },
        )
    }
}
