//! Stop conditions: stateful predicates evaluated once per iteration
//! against the live history.
//!
//! A condition reports a [`Verdict`] (should the run stop, and why) every
//! call. Counters advance only inside `evaluate`; `reset` restores
//! construction state so a condition can be reused across independent
//! runs. The engine evaluates every attached condition every iteration and
//! stops as soon as any verdict says stop — there is no short-circuiting,
//! so all reasons can be reported together.

pub mod equal;
pub mod magnitude;
pub mod nan;
pub mod plateau;
pub mod threshold;

pub use equal::{StopWhenEqual, Target};
pub use magnitude::StopOnMagnitudeJump;
pub use nan::StopIfNan;
pub use plateau::StopAtPlateau;
pub use threshold::StopIfAbove;

use crate::errors::ConditionError;
use crate::history::History;
use crate::record::Record;
use crate::traits::Scalar;

/// One evaluation result: whether to stop, and a human-readable reason
/// either way.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub should_stop: bool,
    pub reason: String,
}

impl Verdict {
    pub fn stop(reason: impl Into<String>) -> Self {
        Self {
            should_stop: true,
            reason: reason.into(),
        }
    }

    /// A non-stopping verdict with an explanatory reason.
    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            should_stop: false,
            reason: reason.into(),
        }
    }
}

/// A pluggable termination predicate over the run history.
///
/// Implementations must be safe to call every iteration and must not
/// assume they are called exactly once per iteration: any internal
/// counters advance only within `evaluate`. A missing tracked variable is
/// a [`ConditionError`], never a silent "no stop".
pub trait StopCondition<T: Scalar, R: Record<T>> {
    /// Short name used in status reports, e.g. `"StopIfNan"`.
    fn label(&self) -> &'static str;

    fn evaluate(&mut self, history: &History<T, R>) -> Result<Verdict, ConditionError>;

    /// Restores all running state (counters, baselines) to construction
    /// values, for reuse in a new run.
    fn reset(&mut self);
}

/// Latest value of `name`, with history errors tagged by condition label.
/// `Ok(None)` means nothing has been recorded yet.
pub(crate) fn latest<T: Scalar, R: Record<T>>(
    history: &History<T, R>,
    name: &str,
    condition: &'static str,
) -> Result<Option<T>, ConditionError> {
    history
        .latest(name)
        .map_err(|source| ConditionError::History { condition, source })
}

pub(crate) fn validate_tracking(name: &str) -> Result<(), crate::errors::ConfigError> {
    if name.trim().is_empty() {
        return Err(crate::errors::ConfigError::EmptyVariableName);
    }
    Ok(())
}

pub(crate) fn validate_patience(patience: usize) -> Result<(), crate::errors::ConfigError> {
    if patience == 0 {
        return Err(crate::errors::ConfigError::InvalidPatience { got: patience });
    }
    Ok(())
}
