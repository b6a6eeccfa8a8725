//! Composite quadrature rules.
//!
//! Non-iterative helpers evaluating a definite integral on a uniform grid
//! of `n` panels.

use anyhow::{bail, Result};

fn validate_span(a: f64, b: f64, n: usize) -> Result<()> {
    if !a.is_finite() || !b.is_finite() || b <= a {
        bail!("integration bounds must be finite with b > a, got [{a}, {b}]");
    }
    if n == 0 {
        bail!("at least one panel is required");
    }
    Ok(())
}

/// Composite trapezoidal rule over `n` panels:
/// h/2 [f(a) + 2 Σ f(x_i) + f(b)].
pub fn trapezoidal(function: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> Result<f64> {
    validate_span(a, b, n)?;

    let h = (b - a) / n as f64;
    let mut interior = 0.0;
    for i in 1..n {
        interior += function(a + i as f64 * h);
    }
    Ok(h / 2.0 * (function(a) + 2.0 * interior + function(b)))
}

/// Composite Simpson rule over `n` panels (`n` must be even):
/// h/3 [f(a) + 4 Σ_odd f(x_i) + 2 Σ_even f(x_i) + f(b)].
pub fn simpson(function: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> Result<f64> {
    validate_span(a, b, n)?;
    if n % 2 != 0 {
        bail!("Simpson's rule requires an even panel count, got {n}");
    }

    let h = (b - a) / n as f64;
    let mut odd = 0.0;
    let mut even = 0.0;
    for i in 1..n {
        let fx = function(a + i as f64 * h);
        if i % 2 == 1 {
            odd += fx;
        } else {
            even += fx;
        }
    }
    Ok(h / 3.0 * (function(a) + 4.0 * odd + 2.0 * even + function(b)))
}
