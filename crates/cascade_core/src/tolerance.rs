//! Absolute/relative convergence tests shared by the stop conditions.
//!
//! The combination policy is OR: either tolerance being satisfied counts as
//! convergence. Relative difference is `|current - target| / |target|` and
//! is unsatisfiable at a zero target, so only the absolute branch can pass
//! there.

use num_traits::ToPrimitive;

use crate::errors::ConfigError;
use crate::traits::Scalar;

/// An absolute and/or relative tolerance, validated at construction.
/// At least one bound must be present; each must be finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance<T> {
    absolute: Option<T>,
    relative: Option<T>,
}

/// Outcome of a single tolerance test.
#[derive(Debug, Clone, Copy)]
pub struct ToleranceCheck<T> {
    pub abs_diff: T,
    /// `None` when the target is zero (relative difference undefined).
    pub rel_diff: Option<T>,
    pub abs_met: bool,
    pub rel_met: bool,
}

impl<T: Scalar> ToleranceCheck<T> {
    pub fn satisfied(&self) -> bool {
        self.abs_met || self.rel_met
    }
}

impl<T: Scalar> Tolerance<T> {
    pub fn new(absolute: Option<T>, relative: Option<T>) -> Result<Self, ConfigError> {
        if absolute.is_none() && relative.is_none() {
            return Err(ConfigError::NoToleranceGiven);
        }
        if let Some(abs) = absolute {
            if !abs.is_finite() || abs <= T::zero() {
                return Err(ConfigError::InvalidAbsoluteTolerance {
                    got: abs.to_f64().unwrap_or(f64::NAN),
                });
            }
        }
        if let Some(rel) = relative {
            if !rel.is_finite() || rel <= T::zero() {
                return Err(ConfigError::InvalidRelativeTolerance {
                    got: rel.to_f64().unwrap_or(f64::NAN),
                });
            }
        }
        Ok(Self { absolute, relative })
    }

    pub fn absolute(tolerance: T) -> Result<Self, ConfigError> {
        Self::new(Some(tolerance), None)
    }

    pub fn relative(tolerance: T) -> Result<Self, ConfigError> {
        Self::new(None, Some(tolerance))
    }

    pub fn absolute_or_relative(absolute: T, relative: T) -> Result<Self, ConfigError> {
        Self::new(Some(absolute), Some(relative))
    }

    /// Tests `current` against `target` under the OR-combination policy.
    pub fn check(&self, current: T, target: T) -> ToleranceCheck<T> {
        let abs_diff = (current - target).abs();
        let rel_diff = if target == T::zero() {
            None
        } else {
            Some(abs_diff / target.abs())
        };

        let abs_met = match self.absolute {
            Some(tol) => abs_diff <= tol,
            None => false,
        };
        let rel_met = match (self.relative, rel_diff) {
            (Some(tol), Some(diff)) => diff <= tol,
            _ => false,
        };

        ToleranceCheck {
            abs_diff,
            rel_diff,
            abs_met,
            rel_met,
        }
    }

    /// Human-readable account of which tolerance branches passed, e.g.
    /// `"abs diff 3e-8 <= 1e-6"`. For an unsatisfied check, reports each
    /// configured branch with the comparison that failed.
    pub fn describe(&self, check: &ToleranceCheck<T>) -> String {
        let mut parts = Vec::new();
        if let Some(tol) = self.absolute {
            let op = if check.abs_met { "<=" } else { ">" };
            parts.push(format!("abs diff {} {} {}", check.abs_diff, op, tol));
        }
        if let Some(tol) = self.relative {
            match check.rel_diff {
                Some(diff) => {
                    let op = if check.rel_met { "<=" } else { ">" };
                    parts.push(format!("rel diff {} {} {}", diff, op, tol));
                }
                None => parts.push("rel diff undefined at zero target".to_string()),
            }
        }
        let joiner = if check.satisfied() { " or " } else { " and " };
        parts.join(joiner)
    }
}
