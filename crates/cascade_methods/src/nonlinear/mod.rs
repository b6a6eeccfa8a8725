//! Newton iteration for square nonlinear systems F(x) = 0.

pub mod newton_system;

pub use newton_system::{NewtonSystem, SystemSolution};
