//! Root finding for scalar functions f(x) = 0.
//!
//! Bracketing methods (bisection, false position) shrink a sign-changing
//! interval; open methods (Newton-Raphson, secant, fixed point) iterate
//! from a starting guess. All of them drive the same engine and differ
//! only in their state schema, step closure, and stop conditions.

pub mod bisection;
pub mod false_position;
pub mod fixed_point;
pub mod newton;
pub mod secant;

mod bracket;

pub use bisection::Bisection;
pub use false_position::FalsePosition;
pub use fixed_point::FixedPoint;
pub use newton::NewtonRaphson;
pub use secant::Secant;

use cascade_core::engine::RunOutcome;
use cascade_core::history::Table;
use serde::Serialize;

/// Outcome of a root-finding run: the distilled answer plus the full
/// iteration trace for inspection or export.
#[derive(Debug, Clone, Serialize)]
pub struct RootSolution {
    pub root: f64,
    pub f_root: f64,
    /// Step invocations performed (the initial state is iteration 0).
    pub iterations: usize,
    pub outcome: RunOutcome,
    pub table: Table<f64>,
}

/// Whether `u` and `v` lie on opposite sides of zero. Signed zeros count
/// by their sign bit, matching the bracket-selection convention.
pub(crate) fn opposite_signs(u: f64, v: f64) -> bool {
    u.is_sign_positive() != v.is_sign_positive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_signs_tracks_the_sign_bit() {
        assert!(opposite_signs(-1.0, 2.0));
        assert!(!opposite_signs(1.0, 2.0));
        assert!(!opposite_signs(-1.0, -2.0));
        assert!(opposite_signs(-0.0, 0.0));
    }
}
