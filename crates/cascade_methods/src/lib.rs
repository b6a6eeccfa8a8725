//! The `cascade_methods` crate implements the numerical methods of Cascade
//! as clients of the `cascade_core` iteration engine. Each method is a
//! value type holding its parameters; solving constructs an engine,
//! registers the method's stop conditions, and supplies a step closure.
//! Every solver exposes the full run history as a table alongside its
//! distilled answer.

pub mod interpolation;
pub mod linear;
pub mod nonlinear;
pub mod ode;
pub mod optimize;
pub mod quadrature;
pub mod root_finding;
pub mod settings;
