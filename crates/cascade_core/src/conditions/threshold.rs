use crate::conditions::{latest, validate_patience, validate_tracking, StopCondition, Verdict};
use crate::errors::{ConditionError, ConfigError};
use crate::history::History;
use crate::record::Record;
use crate::traits::Scalar;

/// Stops once a tracked variable has been above a threshold for `patience`
/// consecutive iterations. A NaN in the tracked variable stops
/// immediately. Used, for example, to end an ODE integration at its final
/// time.
#[derive(Debug, Clone)]
pub struct StopIfAbove<T> {
    tracking: String,
    threshold: T,
    include_equal: bool,
    patience: usize,
    counter: usize,
}

impl<T: Scalar> StopIfAbove<T> {
    pub fn new(
        tracking: impl Into<String>,
        threshold: T,
        patience: usize,
    ) -> Result<Self, ConfigError> {
        let tracking = tracking.into();
        validate_tracking(&tracking)?;
        validate_patience(patience)?;
        if threshold.is_nan() {
            return Err(ConfigError::InvalidThreshold);
        }
        Ok(Self {
            tracking,
            threshold,
            include_equal: false,
            patience,
            counter: 0,
        })
    }

    /// Also stop when the value equals the threshold exactly.
    pub fn include_equal(mut self, include: bool) -> Self {
        self.include_equal = include;
        self
    }
}

impl<T: Scalar, R: Record<T>> StopCondition<T, R> for StopIfAbove<T> {
    fn label(&self) -> &'static str {
        "StopIfAbove"
    }

    fn evaluate(&mut self, history: &History<T, R>) -> Result<Verdict, ConditionError> {
        let label = <Self as StopCondition<T, R>>::label(self);
        let Some(current) = latest(history, &self.tracking, label)? else {
            return Ok(Verdict::hold("no state recorded yet"));
        };
        if current.is_nan() {
            return Ok(Verdict::stop(format!(
                "variable '{}' is NaN",
                self.tracking
            )));
        }

        let met = current > self.threshold || (self.include_equal && current == self.threshold);
        let comparison = if self.include_equal { ">=" } else { ">" };
        if met {
            self.counter += 1;
            if self.counter >= self.patience {
                Ok(Verdict::stop(format!(
                    "variable '{}' = {} {comparison} threshold {} for {} iteration(s)",
                    self.tracking, current, self.threshold, self.patience
                )))
            } else {
                Ok(Verdict::hold(format!(
                    "variable '{}' = {} {comparison} threshold {}, {}/{} iteration(s)",
                    self.tracking, current, self.threshold, self.counter, self.patience
                )))
            }
        } else {
            self.counter = 0;
            Ok(Verdict::hold(format!(
                "variable '{}' = {} below threshold {}",
                self.tracking, current, self.threshold
            )))
        }
    }

    fn reset(&mut self) {
        self.counter = 0;
    }
}
