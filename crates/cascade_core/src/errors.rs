//! Error taxonomy for the iteration engine.
//!
//! Configuration and schema errors indicate programmer mistakes and halt
//! immediately; they are never retried. Numerical pathologies (NaN,
//! blow-up) are deliberately *not* errors — the stop-condition system
//! exists to convert them into a clean, explained termination.

use thiserror::Error;

/// Construction-time configuration errors. Rejected before any iteration
/// runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tracked variable name must not be empty")]
    EmptyVariableName,

    #[error("at least one variable must be tracked")]
    NoTrackedVariables,

    #[error("at least one of absolute or relative tolerance must be set")]
    NoToleranceGiven,

    #[error("absolute tolerance must be finite and > 0, got {got}")]
    InvalidAbsoluteTolerance { got: f64 },

    #[error("relative tolerance must be finite and > 0, got {got}")]
    InvalidRelativeTolerance { got: f64 },

    #[error("patience must be at least 1, got {got}")]
    InvalidPatience { got: usize },

    #[error("orders_increase must be at least 1, got {got}")]
    InvalidOrdersIncrease { got: usize },

    #[error("threshold must not be NaN")]
    InvalidThreshold,

    #[error("max_iterations must be at least 1, got {got}")]
    InvalidMaxIterations { got: usize },
}

/// Errors raised by `History` bookkeeping.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// A recorded state's key set differs from the schema frozen by the
    /// first recorded state. Always fatal to the run.
    #[error("state schema mismatch: missing {missing:?}, unexpected {extra:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    /// A lookup referenced a variable that is not part of the schema.
    #[error("unknown variable '{name}'; recorded variables: {known:?}")]
    UnknownVariable { name: String, known: Vec<String> },

    #[error("iteration index {index} out of range for history of length {len}")]
    IndexOutOfRange { index: isize, len: usize },
}

/// A stop condition failed to evaluate. Surfaced immediately rather than
/// silently treated as "no stop".
#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("stop condition [{condition}]: {source}")]
    History {
        condition: &'static str,
        #[source]
        source: HistoryError,
    },
}

/// Errors surfaced by `Engine::run`. After a `Step` error the partial
/// history collected so far remains retrievable through
/// `Engine::history()`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error("step function failed at iteration {iteration}: {source}")]
    Step {
        iteration: usize,
        #[source]
        source: anyhow::Error,
    },
}
