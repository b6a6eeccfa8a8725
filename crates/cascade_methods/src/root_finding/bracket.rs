//! Shared driver for bracketing methods.
//!
//! Bisection and false position differ only in how the trial point is
//! placed inside the current bracket; everything else — sub-bracket
//! selection, exact-root collapse, stop conditions — is common.

use anyhow::{bail, Context, Result};
use cascade_core::engine::{Engine, EngineSettings};
use cascade_core::conditions::{StopIfNan, StopWhenEqual};
use cascade_core::impl_record;

use crate::root_finding::{opposite_signs, RootSolution};
use crate::settings::SolverSettings;

/// Per-iteration state of a bracketing method. `f_*` are the function
/// values at the corresponding points of this state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketState {
    pub t_lower: f64,
    pub t_upper: f64,
    pub t_root: f64,
    pub f_lower: f64,
    pub f_upper: f64,
    pub f_root: f64,
    pub bracket_size: f64,
}

impl_record!(BracketState, f64 {
    t_lower,
    t_upper,
    t_root,
    f_lower,
    f_upper,
    f_root,
    bracket_size,
});

impl BracketState {
    fn collapsed(at: f64) -> Self {
        Self {
            t_lower: at,
            t_upper: at,
            t_root: at,
            f_lower: 0.0,
            f_upper: 0.0,
            f_root: 0.0,
            bracket_size: 0.0,
        }
    }
}

/// Runs a bracketing method. `trial(lower, upper, f_lower, f_upper)`
/// places the next trial point inside the bracket.
pub(crate) fn run_bracketing(
    label: &'static str,
    function: &dyn Fn(f64) -> f64,
    lower: f64,
    upper: f64,
    settings: &SolverSettings,
    trial: &dyn Fn(f64, f64, f64, f64) -> f64,
) -> Result<RootSolution> {
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        bail!("invalid bracket [{lower}, {upper}]: bounds must be finite with lower < upper");
    }
    let f_lower = function(lower);
    let f_upper = function(upper);
    if f_lower.is_nan() || f_upper.is_nan() {
        bail!(
            "function is not defined at the bracket endpoints: \
             f({lower}) = {f_lower}, f({upper}) = {f_upper}"
        );
    }
    if f_lower != 0.0 && f_upper != 0.0 && !opposite_signs(f_lower, f_upper) {
        bail!(
            "function must have opposite signs at the bracket endpoints: \
             f({lower}) = {f_lower}, f({upper}) = {f_upper}"
        );
    }

    let tolerance = settings.tolerance()?;
    let mut engine: Engine<f64, BracketState> = Engine::new(
        label,
        EngineSettings {
            max_iterations: settings.max_iterations,
        },
    )?;
    engine.add_condition(StopWhenEqual::zero("f_root", tolerance, settings.patience)?);
    engine.add_condition(StopWhenEqual::zero("bracket_size", tolerance, 1)?);
    engine.add_condition(StopIfNan::new(["f_lower", "f_upper", "f_root"])?);

    let t_root = trial(lower, upper, f_lower, f_upper);
    let initial = BracketState {
        t_lower: lower,
        t_upper: upper,
        t_root,
        f_lower,
        f_upper,
        f_root: function(t_root),
        bracket_size: (upper - lower).abs(),
    };

    let outcome = engine.run(initial, |history| {
        let prev = *history.last_state().context("history cannot be empty")?;

        // An exact root collapses the bracket; the size condition ends the
        // run on the next evaluation.
        if prev.f_root == 0.0 {
            return Ok(BracketState::collapsed(prev.t_root));
        }
        if prev.f_lower == 0.0 {
            return Ok(BracketState::collapsed(prev.t_lower));
        }
        if prev.f_upper == 0.0 {
            return Ok(BracketState::collapsed(prev.t_upper));
        }

        // Keep the half whose endpoints still change sign.
        let (t_lower, t_upper, f_lower, f_upper) =
            if opposite_signs(prev.f_lower, prev.f_root) {
                (prev.t_lower, prev.t_root, prev.f_lower, prev.f_root)
            } else {
                (prev.t_root, prev.t_upper, prev.f_root, prev.f_upper)
            };

        let t_root = trial(t_lower, t_upper, f_lower, f_upper);
        Ok(BracketState {
            t_lower,
            t_upper,
            t_root,
            f_lower,
            f_upper,
            f_root: function(t_root),
            bracket_size: (t_upper - t_lower).abs(),
        })
    })?;

    let history = engine.history();
    let root = history
        .latest("t_root")?
        .context("no states were recorded")?;
    let f_root = history
        .latest("f_root")?
        .context("no states were recorded")?;
    Ok(RootSolution {
        root,
        f_root,
        iterations: outcome.iterations,
        outcome,
        table: history.to_table(),
    })
}
