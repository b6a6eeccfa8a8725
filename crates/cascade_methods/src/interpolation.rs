//! Polynomial interpolation through fixed nodes.
//!
//! Non-iterative helpers: these build and evaluate interpolants directly
//! rather than driving the engine.

use anyhow::{bail, Result};

fn validate_nodes(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        bail!(
            "node and value counts differ: {} x-values, {} y-values",
            x.len(),
            y.len()
        );
    }
    if x.len() < 2 {
        bail!("interpolation needs at least two nodes, got {}", x.len());
    }
    for i in 0..x.len() {
        for j in (i + 1)..x.len() {
            if x[i] == x[j] {
                bail!("interpolation nodes must be distinct: x[{i}] == x[{j}] == {}", x[i]);
            }
        }
    }
    Ok(())
}

/// Newton-form interpolating polynomial built from divided differences.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonPolynomial {
    nodes: Vec<f64>,
    coefficients: Vec<f64>,
}

impl NewtonPolynomial {
    /// Fits the unique degree-(n-1) polynomial through the given nodes.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        validate_nodes(x, y)?;

        // Divided-difference table, column by column, collapsed in place:
        // after pass j, table[i] = f[x_i, ..., x_{i+j}].
        let n = x.len();
        let mut table = y.to_vec();
        let mut coefficients = vec![table[0]];
        for j in 1..n {
            for i in 0..(n - j) {
                table[i] = (table[i + 1] - table[i]) / (x[i + j] - x[i]);
            }
            coefficients.push(table[0]);
        }
        Ok(Self {
            nodes: x.to_vec(),
            coefficients,
        })
    }

    /// The divided-difference coefficients b_0, b_1, ..., b_{n-1}.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Evaluates at `at` by Horner's scheme over the Newton basis.
    pub fn evaluate(&self, at: f64) -> f64 {
        let n = self.coefficients.len();
        let mut value = self.coefficients[n - 1];
        for i in (0..n - 1).rev() {
            value = value * (at - self.nodes[i]) + self.coefficients[i];
        }
        value
    }
}

/// Evaluates the Lagrange interpolating polynomial through the nodes at a
/// single point. For repeated evaluation prefer [`NewtonPolynomial`],
/// which factors the work into a one-time fit.
pub fn lagrange_interpolate(x: &[f64], y: &[f64], at: f64) -> Result<f64> {
    validate_nodes(x, y)?;

    let mut sum = 0.0;
    for i in 0..x.len() {
        let mut term = y[i];
        for j in 0..x.len() {
            if j != i {
                term *= (at - x[j]) / (x[i] - x[j]);
            }
        }
        sum += term;
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_or_duplicate_nodes() {
        assert!(NewtonPolynomial::fit(&[0.0, 1.0], &[1.0]).is_err());
        assert!(NewtonPolynomial::fit(&[1.0], &[1.0]).is_err());
        assert!(NewtonPolynomial::fit(&[0.0, 1.0, 0.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(lagrange_interpolate(&[0.0, 0.0], &[1.0, 2.0], 0.5).is_err());
    }

    #[test]
    fn newton_form_reproduces_its_nodes() {
        let x = [0.0, 1.0, 3.0, 4.0];
        let y = [1.0, 2.0, 10.0, 17.0];
        let poly = NewtonPolynomial::fit(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert!((poly.evaluate(*xi) - yi).abs() < 1e-12);
        }
    }

    #[test]
    fn a_quadratic_is_recovered_exactly() {
        // f(x) = 2x^2 - 3x + 1 through three nodes.
        let f = |x: f64| 2.0 * x * x - 3.0 * x + 1.0;
        let x = [-1.0, 0.5, 2.0];
        let y: Vec<f64> = x.iter().map(|&xi| f(xi)).collect();
        let poly = NewtonPolynomial::fit(&x, &y).unwrap();
        assert!((poly.evaluate(1.0) - f(1.0)).abs() < 1e-12);
        assert!((poly.evaluate(-3.0) - f(-3.0)).abs() < 1e-10);
    }

    #[test]
    fn newton_and_lagrange_agree() {
        let x = [0.0, 1.0, 2.0, 5.0];
        let y = [3.0, -1.0, 4.0, 0.5];
        let poly = NewtonPolynomial::fit(&x, &y).unwrap();
        for at in [-0.5, 0.7, 3.3, 6.0] {
            let lagrange = lagrange_interpolate(&x, &y, at).unwrap();
            assert!((poly.evaluate(at) - lagrange).abs() < 1e-9);
        }
    }

    #[test]
    fn the_leading_coefficient_matches_the_highest_divided_difference() {
        // For f(x) = x^2 on any nodes, f[x_i, x_{i+1}, x_{i+2}] = 1.
        let x = [1.0, 2.0, 4.0];
        let y = [1.0, 4.0, 16.0];
        let poly = NewtonPolynomial::fit(&x, &y).unwrap();
        assert!((poly.coefficients()[2] - 1.0).abs() < 1e-12);
    }
}
