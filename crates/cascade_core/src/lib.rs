//! The `cascade_core` crate provides the iteration engine that drives every
//! numerical method in Cascade. An algorithm hands the engine an initial
//! state, a step closure, and a list of stop conditions; the engine owns the
//! run loop, the append-only [`history::History`], and the termination
//! protocol.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction), `Record` (fixed-schema
//!   state snapshots), `StopCondition` (termination predicates).
//! - **History**: append-only log of per-iteration states with schema
//!   enforcement and tabular export.
//! - **Conditions**: NaN guard, target/plateau convergence with patience,
//!   order-of-magnitude divergence guard, threshold crossing.
//! - **Engine**: the initialize → step → record → evaluate loop, with an
//!   injected observer sink for logging.

pub mod conditions;
pub mod engine;
pub mod errors;
pub mod history;
pub mod observer;
pub mod record;
pub mod tolerance;
pub mod traits;
