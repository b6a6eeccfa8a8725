use crate::conditions::{validate_patience, validate_tracking, StopCondition, Verdict};
use crate::errors::{ConditionError, ConfigError};
use crate::history::History;
use crate::record::Record;
use crate::tolerance::Tolerance;
use crate::traits::Scalar;

/// Detects that a tracked variable has stopped changing: the value at
/// iteration n is compared to iteration n-1 under the same
/// absolute-OR-relative test as [`super::StopWhenEqual`], with the same
/// consecutive-patience semantics. Needs at least two recorded iterations
/// before it can fire.
#[derive(Debug, Clone)]
pub struct StopAtPlateau<T> {
    tracking: String,
    tolerance: Tolerance<T>,
    patience: usize,
    counter: usize,
}

impl<T: Scalar> StopAtPlateau<T> {
    pub fn new(
        tracking: impl Into<String>,
        tolerance: Tolerance<T>,
        patience: usize,
    ) -> Result<Self, ConfigError> {
        let tracking = tracking.into();
        validate_tracking(&tracking)?;
        validate_patience(patience)?;
        Ok(Self {
            tracking,
            tolerance,
            patience,
            counter: 0,
        })
    }
}

impl<T: Scalar, R: Record<T>> StopCondition<T, R> for StopAtPlateau<T> {
    fn label(&self) -> &'static str {
        "StopAtPlateau"
    }

    fn evaluate(&mut self, history: &History<T, R>) -> Result<Verdict, ConditionError> {
        if history.len() < 2 {
            return Ok(Verdict::hold(
                "need at least two iterations to detect a plateau",
            ));
        }
        let label = <Self as StopCondition<T, R>>::label(self);
        let wrap = |source| ConditionError::History {
            condition: label,
            source,
        };
        let current = history.at(-1, &self.tracking).map_err(wrap)?;
        let previous = history.at(-2, &self.tracking).map_err(wrap)?;

        let check = self.tolerance.check(current, previous);
        if check.satisfied() {
            self.counter += 1;
            if self.counter >= self.patience {
                Ok(Verdict::stop(format!(
                    "variable '{}' plateaued for {} iteration(s) ({})",
                    self.tracking,
                    self.patience,
                    self.tolerance.describe(&check)
                )))
            } else {
                Ok(Verdict::hold(format!(
                    "potential plateau on '{}', {}/{} iteration(s) ({})",
                    self.tracking,
                    self.counter,
                    self.patience,
                    self.tolerance.describe(&check)
                )))
            }
        } else {
            self.counter = 0;
            Ok(Verdict::hold(format!(
                "change detected in '{}': {} -> {} ({})",
                self.tracking,
                previous,
                current,
                self.tolerance.describe(&check)
            )))
        }
    }

    fn reset(&mut self) {
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::VarMap;

    fn push(history: &mut History<f64, VarMap<f64>>, x: f64) {
        history.record(VarMap::new().with("x", x)).unwrap();
    }

    #[test]
    fn holds_before_two_iterations() {
        let mut condition =
            StopAtPlateau::new("x", Tolerance::absolute(1e-6).unwrap(), 1).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();
        let verdict = condition.evaluate(&history).unwrap();
        assert!(!verdict.should_stop);
        assert!(verdict.reason.contains("at least two iterations"));

        push(&mut history, 5.0);
        assert!(!condition.evaluate(&history).unwrap().should_stop);
    }

    #[test]
    fn stops_exactly_at_the_patience_th_flat_transition() {
        // Sequence 5.0, 5.0000001, 5.0000001, 5.0000001 with abs tol 1e-6
        // and patience 2 stops exactly at the third recorded value.
        let mut condition =
            StopAtPlateau::new("x", Tolerance::absolute(1e-6).unwrap(), 2).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, 5.0);
        push(&mut history, 5.000_000_1);
        assert!(!condition.evaluate(&history).unwrap().should_stop); // counter = 1

        push(&mut history, 5.000_000_1);
        assert!(condition.evaluate(&history).unwrap().should_stop); // counter = 2
    }

    #[test]
    fn a_jump_resets_the_counter() {
        let mut condition =
            StopAtPlateau::new("x", Tolerance::absolute(1e-6).unwrap(), 2).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, 5.0);
        push(&mut history, 5.0);
        assert!(!condition.evaluate(&history).unwrap().should_stop); // counter = 1
        push(&mut history, 7.0);
        assert!(!condition.evaluate(&history).unwrap().should_stop); // reset
        push(&mut history, 7.0);
        assert!(!condition.evaluate(&history).unwrap().should_stop); // counter = 1
        push(&mut history, 7.0);
        assert!(condition.evaluate(&history).unwrap().should_stop); // counter = 2
    }
}
