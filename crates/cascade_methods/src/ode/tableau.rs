//! Butcher tableaux for explicit Runge-Kutta methods.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Coefficients of an explicit Runge-Kutta method:
///
/// ```text
/// c_1 | a_11 .. a_1s
/// ... |
/// c_s | a_s1 .. a_ss
/// ----+-------------
///     | b_1  .. b_s
/// ```
///
/// Stage i evaluates k_i = f(t + c_i h, y + h Σ_{j<i} a_ij k_j); the step
/// update is y + h Σ b_i k_i. Only explicit methods are representable:
/// entries on or above the diagonal of A must be zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButcherTableau {
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
}

impl ButcherTableau {
    pub fn new(a: Vec<Vec<f64>>, b: Vec<f64>, c: Vec<f64>) -> Result<Self> {
        let stages = b.len();
        if stages == 0 {
            bail!("tableau must have at least one stage");
        }
        if c.len() != stages {
            bail!("c vector must have {stages} entries, got {}", c.len());
        }
        if a.len() != stages {
            bail!("A matrix must have {stages} rows, got {}", a.len());
        }
        for (i, row) in a.iter().enumerate() {
            if row.len() != stages {
                bail!("A matrix row {i} must have {stages} entries, got {}", row.len());
            }
            for (j, &value) in row.iter().enumerate() {
                if j >= i && value != 0.0 {
                    bail!(
                        "explicit tableau requires a[{i}][{j}] = 0 on/above the diagonal, got {value}"
                    );
                }
            }
        }
        let b_sum: f64 = b.iter().sum();
        if (b_sum - 1.0).abs() > 1e-12 {
            bail!("b vector must sum to 1, got {b_sum}");
        }
        Ok(Self { a, b, c })
    }

    pub fn stages(&self) -> usize {
        self.b.len()
    }

    pub fn a(&self) -> &[Vec<f64>] {
        &self.a
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn c(&self) -> &[f64] {
        &self.c
    }

    /// Forward Euler (1 stage, order 1).
    pub fn euler() -> Self {
        Self {
            a: vec![vec![0.0]],
            b: vec![1.0],
            c: vec![0.0],
        }
    }

    /// Explicit midpoint (2 stages, order 2).
    pub fn midpoint() -> Self {
        Self {
            a: vec![vec![0.0, 0.0], vec![0.5, 0.0]],
            b: vec![0.0, 1.0],
            c: vec![0.0, 0.5],
        }
    }

    /// Heun's method (2 stages, order 2).
    pub fn heun() -> Self {
        Self {
            a: vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            b: vec![0.5, 0.5],
            c: vec![0.0, 1.0],
        }
    }

    /// Ralston's method (2 stages, order 2, minimal truncation error).
    pub fn ralston() -> Self {
        Self {
            a: vec![vec![0.0, 0.0], vec![2.0 / 3.0, 0.0]],
            b: vec![0.25, 0.75],
            c: vec![0.0, 2.0 / 3.0],
        }
    }

    /// The classic Runge-Kutta method (4 stages, order 4).
    pub fn rk4() -> Self {
        Self {
            a: vec![
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.5, 0.0, 0.0, 0.0],
                vec![0.0, 0.5, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            b: vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
            c: vec![0.0, 0.5, 0.5, 1.0],
        }
    }
}
