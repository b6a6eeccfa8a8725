//! Interval bisection.

use anyhow::Result;

use crate::root_finding::bracket::run_bracketing;
use crate::root_finding::RootSolution;
use crate::settings::SolverSettings;

/// Finds a root of f inside a sign-changing bracket by repeated halving.
/// The bracket width halves every iteration, so after N iterations
/// `bracket_size = (upper - lower) / 2^N`.
pub struct Bisection<F: Fn(f64) -> f64> {
    function: F,
    lower: f64,
    upper: f64,
    settings: SolverSettings,
}

impl<F: Fn(f64) -> f64> Bisection<F> {
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
            "bisection",
            &self.function,
            self.lower,
            self.upper,
            &self.settings,
            &|lower, upper, _f_lower, _f_upper| (lower + upper) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_bracket_without_a_sign_change() {
        let err = Bisection::new(|x: f64| x * x + 1.0, -1.0, 1.0)
            .solve()
            .expect_err("no sign change");
        assert!(format!("{err}").contains("opposite signs"));
    }

    #[test]
    fn rejects_an_inverted_bracket() {
        let err = Bisection::new(|x: f64| x, 2.0, -2.0)
            .solve()
            .expect_err("inverted bracket");
        assert!(format!("{err}").contains("lower < upper"));
    }

    #[test]
    fn rejects_undefined_endpoints() {
        let err = Bisection::new(|x: f64| x.sqrt() - 1.0, -4.0, 4.0)
            .solve()
            .expect_err("NaN at lower endpoint");
        assert!(format!("{err}").contains("not defined"));
    }

    #[test]
    fn finds_the_root_of_a_line() {
        let solution = Bisection::new(|x| 2.0 * x - 1.0, 0.0, 2.0)
            .with_settings(SolverSettings {
                patience: 1,
                ..SolverSettings::default()
            })
            .solve()
            .unwrap();
        assert!((solution.root - 0.5).abs() < 1e-5);
        assert!(solution.f_root.abs() <= 1e-6);
    }

    #[test]
    fn an_exact_endpoint_root_collapses_the_bracket() {
        let solution = Bisection::new(|x| x, 0.0, 2.0).solve().unwrap();
        assert_eq!(solution.root, 0.0);
        assert_eq!(solution.f_root, 0.0);
    }
}
