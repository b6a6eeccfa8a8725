//! Shared solver settings: tolerances, patience, and iteration cap.

use cascade_core::errors::ConfigError;
use cascade_core::tolerance::Tolerance;
use serde::{Deserialize, Serialize};

/// Settings shared by the iterative solvers. Both tolerance branches are
/// configured by default; the engine's conditions combine them with OR.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverSettings {
    pub absolute_tolerance: f64,
    pub relative_tolerance: f64,
    /// Consecutive qualifying iterations required before convergence is
    /// declared.
    pub patience: usize,
    pub max_iterations: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            absolute_tolerance: 1e-6,
            relative_tolerance: 1e-6,
            patience: 3,
            max_iterations: 1_000,
        }
    }
}

impl SolverSettings {
    /// Builds the engine-level tolerance from both branches, validating
    /// them in the process.
    pub fn tolerance(&self) -> Result<Tolerance<f64>, ConfigError> {
        Tolerance::absolute_or_relative(self.absolute_tolerance, self.relative_tolerance)
    }
}
