use crate::conditions::{latest, validate_patience, validate_tracking, StopCondition, Verdict};
use crate::errors::{ConditionError, ConfigError};
use crate::history::History;
use crate::record::Record;
use crate::tolerance::Tolerance;
use crate::traits::Scalar;

/// What a tracked variable is compared against.
#[derive(Debug, Clone)]
pub enum Target<T> {
    /// A fixed value.
    Value(T),
    /// The current value of another tracked variable.
    Variable(String),
}

/// Stops once a tracked variable has matched a target within tolerance for
/// `patience` consecutive iterations. The counter resets to zero on any
/// iteration where the test fails.
#[derive(Debug, Clone)]
pub struct StopWhenEqual<T> {
    tracking: String,
    target: Target<T>,
    tolerance: Tolerance<T>,
    patience: usize,
    counter: usize,
}

impl<T: Scalar> StopWhenEqual<T> {
    pub fn new(
        tracking: impl Into<String>,
        target: Target<T>,
        tolerance: Tolerance<T>,
        patience: usize,
    ) -> Result<Self, ConfigError> {
        let tracking = tracking.into();
        validate_tracking(&tracking)?;
        if let Target::Variable(name) = &target {
            validate_tracking(name)?;
        }
        validate_patience(patience)?;
        Ok(Self {
            tracking,
            target,
            tolerance,
            patience,
            counter: 0,
        })
    }

    /// Convergence of `tracking` toward a fixed value.
    pub fn value(
        tracking: impl Into<String>,
        target: T,
        tolerance: Tolerance<T>,
        patience: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(tracking, Target::Value(target), tolerance, patience)
    }

    /// Convergence of `tracking` toward zero. At a zero target only the
    /// absolute tolerance branch can be satisfied.
    pub fn zero(
        tracking: impl Into<String>,
        tolerance: Tolerance<T>,
        patience: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(tracking, Target::Value(T::zero()), tolerance, patience)
    }
}

impl<T: Scalar, R: Record<T>> StopCondition<T, R> for StopWhenEqual<T> {
    fn label(&self) -> &'static str {
        "StopWhenEqual"
    }

    fn evaluate(&mut self, history: &History<T, R>) -> Result<Verdict, ConditionError> {
        let label = <Self as StopCondition<T, R>>::label(self);
        let Some(current) = latest(history, &self.tracking, label)? else {
            return Ok(Verdict::hold("no state recorded yet"));
        };
        let target = match &self.target {
            Target::Value(value) => *value,
            Target::Variable(name) => match latest(history, name, label)? {
                Some(value) => value,
                None => return Ok(Verdict::hold("no state recorded yet")),
            },
        };

        let check = self.tolerance.check(current, target);
        if check.satisfied() {
            self.counter += 1;
            let detail = self.tolerance.describe(&check);
            if self.counter >= self.patience {
                Ok(Verdict::stop(format!(
                    "variable '{}' = {} reached target {} ({}) for {} iteration(s)",
                    self.tracking, current, target, detail, self.patience
                )))
            } else {
                Ok(Verdict::hold(format!(
                    "variable '{}' = {} matches target {} ({}), {}/{} iteration(s)",
                    self.tracking, current, target, detail, self.counter, self.patience
                )))
            }
        } else {
            self.counter = 0;
            Ok(Verdict::hold(format!(
                "variable '{}' = {} != target {} ({})",
                self.tracking,
                current,
                target,
                self.tolerance.describe(&check)
            )))
        }
    }

    fn reset(&mut self) {
        self.counter = 0;
    }
}
