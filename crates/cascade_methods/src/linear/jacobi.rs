//! Jacobi iteration.

use anyhow::Result;
use nalgebra::{DMatrix, DVector};

use crate::linear::{run_linear, LinearSolution};
use crate::settings::SolverSettings;

/// Solves Ax = b by simultaneous sweeps:
/// x_i^{k+1} = (b_i - Σ_{j≠i} a_ij x_j^k) / a_ii.
///
/// Every component of the new iterate is computed from the previous one,
/// so a sweep reads only history. Convergence is guaranteed for strictly
/// diagonally dominant systems.
pub struct Jacobi {
    a: DMatrix<f64>,
    b: DVector<f64>,
    x0: DVector<f64>,
    settings: SolverSettings,
}

impl Jacobi {
    pub fn new(a: DMatrix<f64>, b: DVector<f64>, x0: DVector<f64>) -> Self {
        Self {
            a,
            b,
            x0,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn solve(&self) -> Result<LinearSolution> {
        run_linear(
            "jacobi",
            &self.a,
            &self.b,
            &self.x0,
            &self.settings,
            &|a, b, x| {
                let n = x.len();
                let mut next = DVector::zeros(n);
                for i in 0..n {
                    let mut sum = 0.0;
                    for j in 0..n {
                        if j != i {
                            sum += a[(i, j)] * x[j];
                        }
                    }
                    next[i] = (b[i] - sum) / a[(i, i)];
                }
                next
            },
        )
    }
}
