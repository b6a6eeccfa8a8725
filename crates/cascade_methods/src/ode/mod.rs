//! Explicit Runge-Kutta integration of scalar first-order IVPs
//! dy/dt = f(t, y), y(t0) = y0.
//!
//! A method is its Butcher tableau; the integrator is one engine client
//! that walks t from t0 to t_final in fixed steps, recording every
//! accepted state.

pub mod runge_kutta;
pub mod tableau;

pub use runge_kutta::{OdeSolution, RungeKutta};
pub use tableau::ButcherTableau;
